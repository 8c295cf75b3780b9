//! Property-based tests for the player
//!
//! Random operation sequences against the in-memory platform. Each property
//! checks a lifecycle invariant after every step.

use asmr_playback::testing::Rig;
use asmr_playback::{LocalFile, Player, PlayerConfig, RemoteItem, Thumbnails};
use proptest::prelude::*;

// ===== Helpers =====

#[derive(Debug, Clone)]
enum Op {
    AddLocal(usize),
    AddRemote(usize),
    PlayIndex(usize),
    Next,
    Prev,
    RemoveAt(usize),
    Clear,
    LoadFile,
    Ended,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..4).prop_map(Op::AddLocal),
        2 => (1usize..4).prop_map(Op::AddRemote),
        3 => (0usize..12).prop_map(Op::PlayIndex),
        2 => Just(Op::Next),
        2 => Just(Op::Prev),
        3 => (0usize..12).prop_map(Op::RemoveAt),
        1 => Just(Op::Clear),
        1 => Just(Op::LoadFile),
        1 => Just(Op::Ended),
    ]
}

fn apply(player: &mut Player, op: &Op, counter: &mut usize) {
    match op {
        Op::AddLocal(n) => {
            let files = (0..*n)
                .map(|_| {
                    *counter += 1;
                    LocalFile::new(format!("clip{counter}.mp4"), "video/mp4", 1024)
                })
                .collect();
            player.add_local_files(files);
        }
        Op::AddRemote(n) => {
            let items = (0..*n)
                .map(|_| {
                    *counter += 1;
                    RemoteItem {
                        id: format!("r{counter}"),
                        title: format!("Remote {counter}"),
                        remote_id: format!("vid{counter}"),
                        channel_label: String::new(),
                        thumbnails: Thumbnails::default(),
                        url: format!("https://stream.example.com/{counter}"),
                    }
                })
                .collect();
            player.add_remote_items(items);
        }
        Op::PlayIndex(i) => {
            player.play_index(*i);
        }
        Op::Next => {
            player.next();
        }
        Op::Prev => {
            player.prev();
        }
        Op::RemoveAt(i) => {
            player.remove_at(*i);
        }
        Op::Clear => player.clear_queue(),
        Op::LoadFile => {
            *counter += 1;
            player.load_file(LocalFile::new(format!("single{counter}.mp4"), "video/mp4", 1024));
        }
        Op::Ended => {
            player.on_media_ended();
        }
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: the current index is valid and the active source follows it
    #[test]
    fn current_index_always_valid(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        let mut counter = 0;

        for op in &ops {
            apply(&mut player, op, &mut counter);

            let queue = player.queue();
            if let Some(index) = queue.current_index() {
                prop_assert!(index < queue.len(), "index {} out of {} after {:?}", index, queue.len(), op);
                prop_assert_eq!(
                    player.state().current_source_url.as_deref(),
                    Some(queue.get(index).unwrap().url())
                );
                prop_assert_eq!(rig.element.src(), player.state().current_source_url.clone());
            }
        }
    }

    /// Property: every referenced local URL is outstanding, and nothing else is
    #[test]
    fn outstanding_handles_match_references(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        let mut counter = 0;

        for op in &ops {
            apply(&mut player, op, &mut counter);

            let mut referenced: Vec<String> = player
                .queue()
                .items()
                .iter()
                .filter_map(|item| item.local_url().map(str::to_string))
                .collect();
            if let Some(active) = player.state().current_source_url.as_deref() {
                if active.starts_with("blob:") && !referenced.iter().any(|u| u == active) {
                    referenced.push(active.to_string());
                }
            }

            prop_assert_eq!(player.outstanding_handles(), referenced.len(), "after {:?}", op);
            for url in &referenced {
                prop_assert_eq!(rig.urls.revoke_count(url), 0);
            }
        }
    }

    /// Property: after teardown every created handle was revoked exactly once
    #[test]
    fn handles_released_exactly_once(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        let mut counter = 0;

        for op in &ops {
            apply(&mut player, op, &mut counter);
            prop_assert!(!rig.urls.any_double_revoke(), "double revoke after {:?}", op);
        }
        player.teardown();

        prop_assert_eq!(rig.urls.total_revokes(), rig.urls.created_count());
        prop_assert!(!rig.urls.any_double_revoke());
        prop_assert_eq!(player.outstanding_handles(), 0);
    }

    /// Property: volume state stays in [0, 1] for any slider input
    #[test]
    fn volume_stays_in_range(inputs in prop::collection::vec(prop_oneof![
        -200.0f64..300.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
    ], 1..30), mutes in prop::collection::vec(any::<bool>(), 1..30)) {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());

        for (input, mute) in inputs.iter().zip(mutes.iter().cycle()) {
            player.handle_volume_change(*input);
            if *mute {
                player.toggle_mute();
            }
            let volume = player.state().volume;
            prop_assert!((0.0..=1.0).contains(&volume), "volume {} out of range", volume);
            prop_assert!((0.0..=1.0).contains(&rig.element.volume()));
        }
    }
}
