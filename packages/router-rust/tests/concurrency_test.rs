//! Routing under concurrent reconfiguration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use keyroute_core::{DestinationNotFound, DestinationResolver, RoutingKey};
use keyroute_router::MappingRouter;
use tracing_subscriber::EnvFilter;

/// Resolves every name to itself.
struct EchoResolver;

impl DestinationResolver<String> for EchoResolver {
    fn resolve_destination(&self, name: &str) -> Result<String, DestinationNotFound> {
        Ok(name.to_string())
    }
}

#[derive(Debug)]
struct Msg;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn table(tag: &str, keys: &[&str]) -> HashMap<String, String> {
    keys.iter()
        .map(|k| ((*k).to_string(), format!("{tag}-{k}")))
        .collect()
}

fn make_router(keys: &'static str) -> Arc<MappingRouter<Msg, String>> {
    Arc::new(MappingRouter::new(
        Arc::new(move |_: &Msg| vec![RoutingKey::<String>::from(keys)]),
        Arc::new(EchoResolver),
    ))
}

#[test]
fn bulk_replace_is_never_observed_half_applied() {
    init_tracing();
    let keys = ["k1", "k2", "k3", "k4"];
    let router = make_router("k1,k2,k3,k4");
    let table_a = table("a", &keys);
    let table_b = table("b", &keys);
    router.set_channel_mappings(table_a.clone());

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let router = Arc::clone(&router);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut flip = false;
            while !stop.load(Ordering::Relaxed) {
                let next = if flip { &table_a } else { &table_b };
                router.set_channel_mappings(next.clone());
                flip = !flip;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let destinations = router.route(&Msg).unwrap();
                    assert_eq!(destinations.len(), 4);
                    let tag = &destinations[0][..2];
                    assert!(tag == "a-" || tag == "b-", "unexpected {destinations:?}");
                    assert!(
                        destinations.iter().all(|d| d.starts_with(tag)),
                        "mixed tables in one route: {destinations:?}"
                    );
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}

#[test]
fn concurrent_single_entry_edits_are_not_lost() {
    init_tracing();
    let router = make_router("k");

    let writers: Vec<_> = (0..8)
        .map(|t| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for i in 0..100 {
                    router.set_channel_mapping(&format!("t{t}-{i}"), "dest");
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(router.channel_mappings().len(), 800);
}

#[test]
fn routing_continues_while_entries_change() {
    init_tracing();
    let router = make_router("k");
    router.set_channel_mapping("k", "first");

    let editor = {
        let router = Arc::clone(&router);
        thread::spawn(move || {
            for i in 0..1_000 {
                if i % 2 == 0 {
                    router.set_channel_mapping("k", "second");
                } else {
                    router.remove_channel_mapping("k");
                }
            }
        })
    };

    for _ in 0..1_000 {
        let destinations = router.route(&Msg).unwrap();
        assert_eq!(destinations.len(), 1);
        let name = destinations[0].as_str();
        assert!(
            matches!(name, "first" | "second" | "k"),
            "unexpected destination {name}"
        );
    }
    editor.join().unwrap();
}
