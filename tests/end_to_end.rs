//! End-to-end integration tests for the navigation stack
//!
//! These tests drive the complete workflow:
//! 1. Build synthetic disc images (index, movie objects, playlists)
//! 2. Open them through an in-memory resource provider
//! 3. Run disc playback and follow the navigation machine
//! 4. Verify the event stream the application would observe

use std::cell::RefCell;
use std::rc::Rc;

use bdnav_runtime::{
    ErrorDomain, MemoryProvider, NavigationError, Player, PlayerError, PlayerEvent, Resource,
    TITLE_FIRST_PLAY,
};

// ============================================================================
// Disc image builders
// ============================================================================

/// Index with HDMV first-play and top-menu entries (0xffff = absent) plus
/// HDMV titles referencing the given movie objects.
fn build_index(first_play: u16, top_menu: u16, titles: &[u16]) -> Vec<u8> {
    let index_start = 78usize;
    let mut buf = vec![0u8; index_start];
    buf[0..8].copy_from_slice(b"INDX0200");
    buf[8..12].copy_from_slice(&(index_start as u32).to_be_bytes());
    buf[40..44].copy_from_slice(&34u32.to_be_bytes());

    let index_len = 26 + titles.len() * 12;
    buf.extend_from_slice(&(index_len as u32).to_be_bytes());

    let object = |id_ref: u16| {
        let mut entry = [0u8; 12];
        entry[0] = 0x40; // hdmv
        entry[6..8].copy_from_slice(&id_ref.to_be_bytes());
        entry
    };
    buf.extend_from_slice(&object(first_play));
    buf.extend_from_slice(&object(top_menu));
    buf.extend_from_slice(&(titles.len() as u16).to_be_bytes());
    for &id_ref in titles {
        buf.extend_from_slice(&object(id_ref));
    }
    buf
}

fn build_mobj(objects: &[&[(u32, u32, u32)]]) -> Vec<u8> {
    let mut buf = vec![0u8; 50];
    buf[0..8].copy_from_slice(b"MOBJ0200");
    buf[48..50].copy_from_slice(&(objects.len() as u16).to_be_bytes());
    for cmds in objects {
        buf.extend_from_slice(&[0x80, 0]); // resume intention
        buf.extend_from_slice(&(cmds.len() as u16).to_be_bytes());
        for &(word, dst, src) in *cmds {
            buf.extend_from_slice(&word.to_be_bytes());
            buf.extend_from_slice(&dst.to_be_bytes());
            buf.extend_from_slice(&src.to_be_bytes());
        }
    }
    buf
}

/// Minimal playlist: one play item with one video stream, one entry mark.
fn build_playlist() -> Vec<u8> {
    let list_pos = 58usize;
    let mut buf = vec![0u8; list_pos];
    buf[0..8].copy_from_slice(b"MPLS0200");
    buf[8..12].copy_from_slice(&(list_pos as u32).to_be_bytes());
    buf[45] = 1; // sequential playback

    // play-item list header
    buf.extend_from_slice(&0u32.to_be_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(&1u16.to_be_bytes()); // play items
    buf.extend_from_slice(&0u16.to_be_bytes()); // sub paths

    let mut item = Vec::new();
    item.extend_from_slice(&55u16.to_be_bytes());
    item.extend_from_slice(b"00001");
    item.extend_from_slice(b"M2TS");
    item.push(0);
    item.push(0x01); // cc=1, single angle
    item.push(0); // stc
    item.extend_from_slice(&900_000u32.to_be_bytes()); // in
    item.extend_from_slice(&1_800_000u32.to_be_bytes()); // out
    item.extend_from_slice(&0u64.to_be_bytes()); // uo mask
    item.push(0);
    item.push(0); // no still
    item.extend_from_slice(&[0, 0]);
    // stream table: one video stream
    item.extend_from_slice(&[0, 0, 0, 0]); // len + reserved
    item.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
    item.extend_from_slice(&[0, 0, 0, 0]);
    item.extend_from_slice(&[3, 1, 0x10, 0x11, 2, 0x1b, 0x16]);
    assert_eq!(item.len(), 57);
    buf.extend_from_slice(&item);

    // mark section: one chapter mark at the item start
    let mark_pos = buf.len();
    buf[12..16].copy_from_slice(&(mark_pos as u32).to_be_bytes());
    buf.extend_from_slice(&0u32.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.push(0);
    buf.push(1); // entry mark
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&900_000u32.to_be_bytes());
    buf.extend_from_slice(&0xffffu16.to_be_bytes());
    buf.extend_from_slice(&0u32.to_be_bytes());
    buf
}

// ============================================================================
// Command-word builders
// ============================================================================

fn branch(sub: u32, option: u32) -> u32 {
    (sub << 29) | (1 << 26) | (option << 20) | (1 << 16)
}

fn jump_title(title: u32) -> (u32, u32, u32) {
    (branch(1, 1), title, 0)
}

fn play_pl(playlist: u32) -> (u32, u32, u32) {
    (branch(2, 0), playlist, 0)
}

fn move_imm(gpr: u32, value: u32) -> (u32, u32, u32) {
    ((2 << 26) | (2 << 24) | (1 << 17) | (1 << 3), gpr, value)
}

// ============================================================================
// Test harness
// ============================================================================

/// Routes `tracing` output through the test harness; filter with
/// `RUST_LOG=debug` and `--nocapture`.
fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn open_player(provider: MemoryProvider) -> (Player, Rc<RefCell<Vec<PlayerEvent>>>) {
    trace_init();
    let mut player = Player::open(provider).expect("disc should open");
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    player.subscribe(move |event| sink.borrow_mut().push(*event));
    (player, events)
}

fn standard_disc() -> MemoryProvider {
    // first play jumps to title 1, whose object starts playlist 1;
    // the top menu object just marks that it ran
    let mut provider = MemoryProvider::new();
    provider.insert(Resource::Index, build_index(0, 1, &[2]));
    provider.insert(
        Resource::MovieObjects,
        build_mobj(&[
            &[jump_title(1)],
            &[move_imm(100, 7)],
            &[play_pl(1)],
        ]),
    );
    provider.insert(Resource::Playlist("00001".into()), build_playlist());
    provider
}

// ============================================================================
// Disc open
// ============================================================================

#[test]
fn test_open_resolves_disc_info() {
    let (player, _) = open_player(standard_disc());
    let info = player.disc_info();
    assert!(info.first_play_supported);
    assert!(info.top_menu_supported);
    assert!(!info.no_menu_support);
    assert_eq!(info.num_titles, 1);
    // top menu, the title, first play
    assert_eq!(info.titles.len(), 3);
}

#[test]
fn test_open_requires_an_index() {
    let err = Player::open(MemoryProvider::new()).unwrap_err();
    assert!(matches!(err, PlayerError::Provider(_)));
}

// ============================================================================
// Playback flow
// ============================================================================

#[test]
fn test_play_runs_first_play_into_a_playlist() {
    let (mut player, events) = open_player(standard_disc());
    player.play().expect("playback should start");

    let events = events.borrow();
    // first play resolved the title jump and the title started its playlist
    assert!(events.contains(&PlayerEvent::Title(TITLE_FIRST_PLAY)));
    assert!(events.contains(&PlayerEvent::Title(1)));
    assert!(events.contains(&PlayerEvent::Playlist(1)));
    assert!(events.contains(&PlayerEvent::PlayItem(0)));
    assert!(!events.contains(&PlayerEvent::Error(ErrorDomain::Hdmv)));
    // the title is still presenting, not over
    assert!(!events.contains(&PlayerEvent::EndOfTitle));

    assert_eq!(player.psr(4), Some(1));
    assert_eq!(player.psr(6), Some(1));
}

#[test]
fn test_playlist_end_resumes_the_movie_object() {
    let (mut player, events) = open_player(standard_disc());
    player.play().unwrap();
    assert!(!events.borrow().contains(&PlayerEvent::EndOfTitle));

    player.playlist_ended().unwrap();
    assert!(events.borrow().contains(&PlayerEvent::EndOfTitle));
}

#[test]
fn test_initial_state_is_replayed_to_subscribers() {
    let (mut player, events) = open_player(standard_disc());
    player.play().unwrap();

    let events = events.borrow();
    // stream-selection registers are announced as if freshly written
    assert_eq!(events[0], PlayerEvent::Angle(1));
    assert!(events.contains(&PlayerEvent::AudioStream(0xff)));
    assert!(events.contains(&PlayerEvent::IgStream(1)));
    assert!(events.contains(&PlayerEvent::PgTextSt(false)));
}

#[test]
fn test_play_title_switches_objects() {
    let (mut player, events) = open_player(standard_disc());
    player.play().unwrap();

    events.borrow_mut().clear();
    player.play_title(0).expect("top menu should start");
    let events = events.borrow();
    assert!(events.contains(&PlayerEvent::Title(0)));
    assert!(events.contains(&PlayerEvent::EndOfTitle));
    assert_eq!(player.psr(4), Some(0));
}

#[test]
fn test_unknown_title_is_rejected() {
    let (mut player, _) = open_player(standard_disc());
    player.play().unwrap();
    let err = player.play_title(9).unwrap_err();
    assert!(matches!(
        err,
        PlayerError::Navigation(NavigationError::TitleNotFound { title: 9 })
    ));
}

#[test]
fn test_title_selection_requires_playback() {
    let (mut player, _) = open_player(standard_disc());
    let err = player.play_title(1).unwrap_err();
    assert!(matches!(
        err,
        PlayerError::Navigation(NavigationError::TitleNotFound { title: 1 })
    ));
}

// ============================================================================
// Degenerate discs
// ============================================================================

#[test]
fn test_menuless_disc_cannot_play() {
    let mut provider = MemoryProvider::new();
    provider.insert(Resource::Index, build_index(0xffff, 0xffff, &[0]));
    provider.insert(Resource::MovieObjects, build_mobj(&[&[play_pl(1)]]));

    let (mut player, _) = open_player(provider);
    assert!(player.disc_info().no_menu_support);
    let err = player.play().unwrap_err();
    assert!(matches!(
        err,
        PlayerError::Navigation(NavigationError::NoMenuSupport)
    ));
}

#[test]
fn test_managed_app_title_is_rejected() {
    let mut index = build_index(0, 1, &[0]);
    // rewrite the title entry as a managed application
    let entry = 78 + 4 + 26;
    index[entry] = 0x80;
    index[entry + 4] = 3;
    index[entry + 6..entry + 11].copy_from_slice(b"00001");

    let mut provider = MemoryProvider::new();
    provider.insert(Resource::Index, index);
    provider.insert(
        Resource::MovieObjects,
        build_mobj(&[&[move_imm(1, 1)], &[move_imm(1, 2)]]),
    );

    let (mut player, _) = open_player(provider);
    player.play().unwrap();
    let err = player.play_title(1).unwrap_err();
    assert!(matches!(
        err,
        PlayerError::Navigation(NavigationError::ManagedAppUnsupported)
    ));
}

#[test]
fn test_missing_playlist_reports_an_error_event() {
    let mut provider = MemoryProvider::new();
    provider.insert(Resource::Index, build_index(0, 0xffff, &[]));
    provider.insert(Resource::MovieObjects, build_mobj(&[&[play_pl(1)]]));

    let (mut player, events) = open_player(provider);
    player.play().expect("navigation itself should not fail");
    assert!(events
        .borrow()
        .contains(&PlayerEvent::Error(ErrorDomain::Hdmv)));
}

#[test]
fn test_missing_movie_objects_reports_an_error_event() {
    let mut provider = MemoryProvider::new();
    provider.insert(Resource::Index, build_index(0, 0xffff, &[]));

    let (mut player, events) = open_player(provider);
    player.play().unwrap();
    assert!(events
        .borrow()
        .contains(&PlayerEvent::Error(ErrorDomain::Hdmv)));
}

// ============================================================================
// User-operation masks
// ============================================================================

#[test]
fn test_uo_mask_follows_the_active_object() {
    let mut mobj = build_mobj(&[&[jump_title(1)], &[play_pl(1)]]);
    // set the menu-call mask on object 1 (each object record is 16 bytes)
    mobj[50 + 16] = 0x40;

    let mut provider = MemoryProvider::new();
    provider.insert(Resource::Index, build_index(0, 0xffff, &[1]));
    provider.insert(Resource::MovieObjects, mobj);
    provider.insert(Resource::Playlist("00001".into()), build_playlist());

    let (mut player, _) = open_player(provider);
    assert!(!player.uo_mask().menu_call());
    player.play().unwrap();
    // object 1 is waiting on its playlist and its mask applies
    assert!(player.uo_mask().menu_call());
    assert!(!player.uo_mask().title_search());
}
