//! Cross-module tests: disc files decoded by `bdnav-spec` executed by the
//! `bdnav-runtime` machine, without the player in between.

use std::sync::Arc;

use bdnav_runtime::{HdmvEvent, HdmvVm, RegisterBank, TitleCaps};
use bdnav_spec::{Instruction, MovieObjects, Playlist};

// ============================================================================
// Helpers
// ============================================================================

fn build_mobj(objects: &[&[(u32, u32, u32)]]) -> Vec<u8> {
    let mut buf = vec![0u8; 50];
    buf[0..8].copy_from_slice(b"MOBJ0200");
    buf[48..50].copy_from_slice(&(objects.len() as u16).to_be_bytes());
    for cmds in objects {
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&(cmds.len() as u16).to_be_bytes());
        for &(word, dst, src) in *cmds {
            buf.extend_from_slice(&word.to_be_bytes());
            buf.extend_from_slice(&dst.to_be_bytes());
            buf.extend_from_slice(&src.to_be_bytes());
        }
    }
    buf
}

fn vm_for(mobj: &MovieObjects) -> HdmvVm {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let mut vm = HdmvVm::new(TitleCaps {
        num_titles: 0,
        first_play: true,
        top_menu: false,
    });
    vm.set_movie_objects(Arc::new(mobj.clone()));
    vm
}

/// SET operation with a register destination and immediate source.
fn set_imm(option: u32, gpr: u32, value: u32) -> (u32, u32, u32) {
    ((2 << 26) | (2 << 24) | (1 << 17) | (option << 3), gpr, value)
}

/// SET operation over two register operands.
fn set_reg(option: u32, dst: u32, src: u32) -> (u32, u32, u32) {
    ((2 << 26) | (2 << 24) | (option << 3), dst, src)
}

fn compare_imm(option: u32, gpr: u32, value: u32) -> (u32, u32, u32) {
    ((2 << 26) | (1 << 24) | (1 << 17) | (option << 12), gpr, value)
}

fn goto(target: u32) -> (u32, u32, u32) {
    ((1 << 26) | (1 << 20) | (1 << 16), target, 0)
}

// ============================================================================
// Decoded programs running in the machine
// ============================================================================

#[test]
fn test_decoded_arithmetic_program() {
    // r1 = 6; r1 *= 7; r2 = r1; r2 |= 0x100
    let data = build_mobj(&[&[
        set_imm(0x1, 1, 6),
        set_imm(0x5, 1, 7),
        set_reg(0x1, 2, 1),
        set_imm(0xa, 2, 0x100),
    ]]);
    let mobj = MovieObjects::decode(&data).expect("container should decode");
    let mut vm = vm_for(&mobj);
    let mut regs = RegisterBank::new();

    vm.select_object(0).unwrap();
    vm.run(&mut regs).unwrap();

    assert_eq!(regs.gpr(1).unwrap(), 42);
    assert_eq!(regs.gpr(2).unwrap(), 0x142);
}

#[test]
fn test_decoded_loop_terminates() {
    // r1 = 50; do { r1 -= 1 } while (r1 != 0)
    let data = build_mobj(&[&[
        set_imm(0x1, 1, 50),
        set_imm(0x4, 1, 1),
        compare_imm(3, 1, 0), // NE: loop back while non-zero
        goto(1),
    ]]);
    let mobj = MovieObjects::decode(&data).unwrap();
    let mut vm = vm_for(&mobj);
    let mut regs = RegisterBank::new();

    vm.select_object(0).unwrap();
    vm.run(&mut regs).unwrap();

    assert_eq!(regs.gpr(1).unwrap(), 0);
    assert!(!vm.is_running());
    let events: Vec<_> = std::iter::from_fn(|| vm.next_event()).collect();
    assert!(events.contains(&HdmvEvent::End));
}

#[test]
fn test_decoded_words_keep_their_mnemonics() {
    let words = [set_imm(0x1, 1, 6), goto(0), compare_imm(2, 1, 1)];
    let data = build_mobj(&[&words]);
    let mobj = MovieObjects::decode(&data).unwrap();
    let commands = &mobj.objects[0].commands;
    assert_eq!(commands[0].insn.mnemonic(), Some("MOVE"));
    assert_eq!(commands[1].insn.mnemonic(), Some("GOTO"));
    assert_eq!(commands[2].insn.mnemonic(), Some("EQ"));

    // decoding kept every word bit-exact
    for (i, &(word, _, _)) in words.iter().enumerate() {
        assert_eq!(commands[i].insn.encode(), word);
        assert_eq!(Instruction::decode(word), commands[i].insn);
    }
}

// ============================================================================
// Playlist metadata feeding navigation
// ============================================================================

#[test]
fn test_playlist_marks_resolve_play_items() {
    let list_pos = 58usize;
    let mut buf = vec![0u8; list_pos];
    buf[0..8].copy_from_slice(b"MPLS0200");
    buf[8..12].copy_from_slice(&(list_pos as u32).to_be_bytes());
    buf[45] = 1;

    buf.extend_from_slice(&0u32.to_be_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(&2u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    for _ in 0..2 {
        let mut item = Vec::new();
        item.extend_from_slice(&48u16.to_be_bytes());
        item.extend_from_slice(b"00001");
        item.extend_from_slice(b"M2TS");
        item.push(0);
        item.push(0x01); // cc=1, single angle
        item.push(0); // stc
        item.extend_from_slice(&0u32.to_be_bytes()); // in
        item.extend_from_slice(&0u32.to_be_bytes()); // out
        item.extend_from_slice(&0u64.to_be_bytes()); // uo mask
        item.extend_from_slice(&[0, 0, 0, 0]);
        // empty stream table
        item.extend_from_slice(&[0, 0, 0, 0]);
        item.extend_from_slice(&[0; 8]);
        item.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(item.len(), 50);
        buf.extend_from_slice(&item);
    }

    let mark_pos = buf.len();
    buf[12..16].copy_from_slice(&(mark_pos as u32).to_be_bytes());
    buf.extend_from_slice(&0u32.to_be_bytes());
    buf.extend_from_slice(&2u16.to_be_bytes());
    for item_ref in [0u16, 1] {
        buf.push(0);
        buf.push(1); // entry mark
        buf.extend_from_slice(&item_ref.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&0xffffu16.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
    }

    let playlist = Playlist::decode(&buf).expect("playlist should decode");
    assert_eq!(playlist.play_items.len(), 2);
    assert_eq!(playlist.marks.len(), 2);
    // each mark points at a distinct play item
    assert_eq!(playlist.marks[0].play_item_ref, 0);
    assert_eq!(playlist.marks[1].play_item_ref, 1);
}
