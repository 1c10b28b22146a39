//! HDMV navigation instruction codec
//!
//! Every movie-object command starts with one 32-bit instruction word,
//! followed by a destination and a source operand. The word packs eleven
//! fields, MSB-first:
//!
//! ```text
//! bits  31..29  sub_group       (3)  branch/set sub-group
//! bits  28..26  operand_count   (3)
//! bits  25..24  group           (2)  0 = branch, 1 = compare, 2 = set
//! bits  23..20  branch_option   (4)
//! bits  19..18  reserved1       (2)
//! bit   17      imm_op2         (1)  operand 2 is immediate
//! bit   16      imm_op1         (1)  operand 1 is immediate
//! bits  15..12  compare_option  (4)
//! bits  11..8   reserved2       (4)
//! bits  7..3    set_option      (5)
//! bits  2..0    reserved3       (3)
//! ```
//!
//! Reserved fields are carried through decoding so that re-encoding a decoded
//! word reproduces it bit for bit, authoring quirks included.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bits::{merge, split};

/// Field widths of the instruction word, MSB-first.
const FIELD_WIDTHS: [u32; 11] = [3, 3, 2, 4, 2, 1, 1, 4, 4, 5, 3];

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub sub_group: u8,
    pub operand_count: u8,
    pub group: u8,
    pub branch_option: u8,
    pub reserved1: u8,
    pub imm_op2: bool,
    pub imm_op1: bool,
    pub compare_option: u8,
    pub reserved2: u8,
    pub set_option: u8,
    pub reserved3: u8,
}

impl Instruction {
    pub fn decode(word: u32) -> Self {
        let [sub_group, operand_count, group, branch_option, reserved1, imm_op2, imm_op1, compare_option, reserved2, set_option, reserved3] =
            split(word, FIELD_WIDTHS);
        Self {
            sub_group: sub_group as u8,
            operand_count: operand_count as u8,
            group: group as u8,
            branch_option: branch_option as u8,
            reserved1: reserved1 as u8,
            imm_op2: imm_op2 != 0,
            imm_op1: imm_op1 != 0,
            compare_option: compare_option as u8,
            reserved2: reserved2 as u8,
            set_option: set_option as u8,
            reserved3: reserved3 as u8,
        }
    }

    pub fn encode(&self) -> u32 {
        merge(
            [
                self.sub_group as u32,
                self.operand_count as u32,
                self.group as u32,
                self.branch_option as u32,
                self.reserved1 as u32,
                self.imm_op2 as u32,
                self.imm_op1 as u32,
                self.compare_option as u32,
                self.reserved2 as u32,
                self.set_option as u32,
                self.reserved3 as u32,
            ],
            FIELD_WIDTHS,
        )
    }

    /// Human-readable operation name, or `None` for unknown encodings.
    pub fn mnemonic(&self) -> Option<&'static str> {
        match InsnGroup::from_u8(self.group)? {
            InsnGroup::Branch => match BranchSubGroup::from_u8(self.sub_group)? {
                BranchSubGroup::Goto => Some(GotoOption::from_u8(self.branch_option)?.mnemonic()),
                BranchSubGroup::Jump => Some(JumpOption::from_u8(self.branch_option)?.mnemonic()),
                BranchSubGroup::Play => Some(PlayOption::from_u8(self.branch_option)?.mnemonic()),
            },
            InsnGroup::Compare => Some(CompareOption::from_u8(self.compare_option)?.mnemonic()),
            InsnGroup::Set => match SetSubGroup::from_u8(self.sub_group)? {
                SetSubGroup::Set => Some(SetOption::from_u8(self.set_option)?.mnemonic()),
                SetSubGroup::SetSystem => {
                    Some(SetSystemOption::from_u8(self.set_option)?.mnemonic())
                }
            },
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(m) => f.write_str(m),
            None => write!(f, "insn({:#010x})", self.encode()),
        }
    }
}

macro_rules! option_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr => $mnemonic:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic),+
                }
            }
        }
    };
}

option_enum! {
    /// Top-level instruction group.
    InsnGroup {
        Branch = 0 => "branch",
        Compare = 1 => "compare",
        Set = 2 => "set",
    }
}

option_enum! {
    /// Sub-group of the branch group.
    BranchSubGroup {
        Goto = 0 => "goto",
        Jump = 1 => "jump",
        Play = 2 => "play",
    }
}

option_enum! {
    GotoOption {
        Nop = 0 => "NOP",
        Goto = 1 => "GOTO",
        Break = 2 => "BREAK",
    }
}

option_enum! {
    JumpOption {
        JumpObject = 0 => "JUMP_OBJECT",
        JumpTitle = 1 => "JUMP_TITLE",
        CallObject = 2 => "CALL_OBJECT",
        CallTitle = 3 => "CALL_TITLE",
        Resume = 4 => "RESUME",
    }
}

option_enum! {
    PlayOption {
        PlayPlaylist = 0 => "PLAY_PL",
        PlayPlaylistItem = 1 => "PLAY_PL_PI",
        PlayPlaylistMark = 2 => "PLAY_PL_PM",
        TerminatePlaylist = 3 => "TERMINATE_PL",
        LinkItem = 4 => "LINK_PI",
        LinkMark = 5 => "LINK_MK",
    }
}

option_enum! {
    /// Compare options. BC is a bit-compare: true when the destination has
    /// any bit set outside the source mask.
    CompareOption {
        Bc = 1 => "BC",
        Eq = 2 => "EQ",
        Ne = 3 => "NE",
        Ge = 4 => "GE",
        Gt = 5 => "GT",
        Le = 6 => "LE",
        Lt = 7 => "LT",
    }
}

option_enum! {
    SetSubGroup {
        Set = 0 => "set",
        SetSystem = 1 => "setsystem",
    }
}

option_enum! {
    SetOption {
        Move = 0x1 => "MOVE",
        Swap = 0x2 => "SWAP",
        Add = 0x3 => "ADD",
        Sub = 0x4 => "SUB",
        Mul = 0x5 => "MUL",
        Div = 0x6 => "DIV",
        Mod = 0x7 => "MOD",
        Rnd = 0x8 => "RND",
        And = 0x9 => "AND",
        Or = 0xa => "OR",
        Xor = 0xb => "XOR",
        BitSet = 0xc => "BITSET",
        BitClr = 0xd => "BITCLR",
        Shl = 0xe => "SHL",
        Shr = 0xf => "SHR",
    }
}

option_enum! {
    SetSystemOption {
        SetStream = 0x1 => "SET_STREAM",
        SetNvTimer = 0x2 => "SET_NV_TIMER",
        SetButtonPage = 0x3 => "SET_BUTTON_PAGE",
        EnableButton = 0x4 => "ENABLE_BUTTON",
        DisableButton = 0x5 => "DISABLE_BUTTON",
        SetSecStream = 0x6 => "SET_SEC_STREAM",
        PopupOff = 0x7 => "POPUP_OFF",
        StillOn = 0x8 => "STILL_ON",
        StillOff = 0x9 => "STILL_OFF",
        SetOutputMode = 0xa => "SET_OUTPUT_MODE",
        SetStreamSs = 0xb => "SET_STREAM_SS",
        SetSystem0x10 = 0x10 => "SETSYSTEM_0x10",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insn(group: u8, sub_group: u8) -> Instruction {
        Instruction {
            sub_group,
            operand_count: 0,
            group,
            branch_option: 0,
            reserved1: 0,
            imm_op2: false,
            imm_op1: false,
            compare_option: 0,
            reserved2: 0,
            set_option: 0,
            reserved3: 0,
        }
    }

    #[test]
    fn decode_field_positions() {
        // sub_group=1 (jump), operand_count=2, group=0 (branch),
        // branch_option=2 (call object), both operands immediate
        let word = (1 << 29) | (2 << 26) | (0 << 24) | (2 << 20) | (1 << 17) | (1 << 16);
        let insn = Instruction::decode(word);
        assert_eq!(insn.sub_group, 1);
        assert_eq!(insn.operand_count, 2);
        assert_eq!(insn.group, 0);
        assert_eq!(insn.branch_option, 2);
        assert!(insn.imm_op1);
        assert!(insn.imm_op2);
        assert_eq!(insn.mnemonic(), Some("CALL_OBJECT"));
    }

    #[test]
    fn encode_inverts_decode() {
        for word in [
            0u32,
            u32::MAX,
            0x2100_0001, // MOVE
            0x2200_0008, // SET_STREAM variants
            0x0002_0000,
            0x4800_5010, // reserved bits set
        ] {
            assert_eq!(Instruction::decode(word).encode(), word);
        }
    }

    #[test]
    fn mnemonics_resolve() {
        let mut goto = insn(0, 0);
        goto.branch_option = 1;
        assert_eq!(goto.mnemonic(), Some("GOTO"));

        let mut cmp = insn(1, 0);
        cmp.compare_option = 2;
        assert_eq!(cmp.mnemonic(), Some("EQ"));

        let mut set = insn(2, 0);
        set.set_option = 0xc;
        assert_eq!(set.mnemonic(), Some("BITSET"));

        let mut sys = insn(2, 1);
        sys.set_option = 0x10;
        assert_eq!(sys.mnemonic(), Some("SETSYSTEM_0x10"));
    }

    #[test]
    fn unknown_encodings_have_no_mnemonic() {
        let mut bad = insn(3, 0);
        assert_eq!(bad.mnemonic(), None);
        bad = insn(1, 0);
        bad.compare_option = 0;
        assert_eq!(bad.mnemonic(), None);
        assert_eq!(format!("{}", bad), "insn(0x01000000)");
    }
}
