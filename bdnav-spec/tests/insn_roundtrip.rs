//! Property tests for the instruction codec

use bdnav_spec::insn::Instruction;
use bdnav_spec::psr;
use proptest::prelude::*;

proptest! {
    /// Every 32-bit word survives decode followed by encode, reserved bits
    /// included.
    #[test]
    fn decode_encode_identity(word in any::<u32>()) {
        let insn = Instruction::decode(word);
        prop_assert_eq!(insn.encode(), word);
    }

    /// Mnemonic resolution never panics, known or not.
    #[test]
    fn mnemonic_total(word in any::<u32>()) {
        let insn = Instruction::decode(word);
        let _ = insn.mnemonic();
        let _ = format!("{insn}");
    }

    /// A PSR operand with stray index bits is never considered valid.
    #[test]
    fn psr_operand_validity(index in 0u32..0x7fff_ffff) {
        let operand = psr::PSR_FLAG | index;
        prop_assert_eq!(psr::is_valid_operand(operand), index <= 0x7f);
    }

    #[test]
    fn gpr_operand_validity(index in 0u32..0x7fff_ffff) {
        prop_assert_eq!(psr::is_valid_operand(index), index <= 0xfff);
    }
}
