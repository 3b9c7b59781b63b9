use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use wirekit::{
    Component, Container, ContainerBuilder, ContainerError, GlobalParameterModule,
    GlobalPropertyModule,
};

#[derive(Debug, Component)]
pub struct Session {
    #[param]
    user: String,
    #[property]
    pub token: String,
}

fn container(module: &GlobalPropertyModule) -> wirekit::Container {
    let mut builder = ContainerBuilder::new();
    builder.register_module(module.clone());
    builder.register_instance(AtomicUsize::new(0));
    builder
        .register_type::<Session>()
        .with_named_parameter("user", "alice".to_string())
        .unwrap();
    builder.build()
}

#[test]
fn test_single_instance_is_shared_across_threads() {
    let mut builder = ContainerBuilder::new();
    builder
        .register_type::<Session>()
        .with_named_parameter("user", "bob".to_string())
        .unwrap()
        .single_instance();
    let container = Arc::new(builder.build());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || container.resolve::<Session>().unwrap())
        })
        .collect();
    let sessions: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let first = &sessions[0];
    assert!(sessions.iter().all(|s| Arc::ptr_eq(s, first)));
    assert_eq!(first.user, "bob");
}

/// Resolve `T` from `threads` threads released at the same moment
fn resolve_together<T: std::any::Any + Send + Sync>(
    container: Container,
    threads: usize,
) -> Vec<Result<Arc<T>, ContainerError>> {
    let container = Arc::new(container);
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let container = Arc::clone(&container);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                container.resolve::<T>()
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn test_provided_instance_survives_concurrent_first_resolve() {
    let mut builder = ContainerBuilder::new();
    builder.register_module(GlobalParameterModule::new());
    builder
        .register_instance("shared".to_string())
        .on_preparing(|_| thread::sleep(Duration::from_millis(50)));
    let container = builder.build();

    let results = resolve_together::<String>(container, 4);

    let values: Vec<_> = results
        .into_iter()
        .map(|result| result.unwrap())
        .collect();
    assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    assert_eq!(values[0].as_str(), "shared");
}

#[test]
fn test_single_instance_activates_once_under_contention() {
    let activations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&activations);

    let mut builder = ContainerBuilder::new();
    builder
        .register_type::<Session>()
        .with_named_parameter("user", "carol".to_string())
        .unwrap()
        .on_activated(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(())
        })
        .single_instance();
    let container = builder.build();

    let sessions: Vec<_> = resolve_together::<Session>(container, 8)
        .into_iter()
        .map(|result| result.unwrap())
        .collect();

    assert_eq!(activations.load(Ordering::SeqCst), 1);
    assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activations_each_get_their_own_value() {
    let module = GlobalPropertyModule::new();
    module
        .add_resolved_property("Token", |c| {
            c.resolve::<AtomicUsize>()
                .map(|counter| format!("token-{}", counter.fetch_add(1, Ordering::SeqCst)))
        })
        .unwrap();
    let container = Arc::new(container(&module));

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let container = Arc::clone(&container);
            tokio::spawn(async move { container.resolve::<Session>().unwrap() })
        })
        .collect();

    let mut tokens = Vec::new();
    for task in tasks {
        let session = task.await.unwrap();
        assert_eq!(session.user, "alice");
        tokens.push(session.token.clone());
    }
    tokens.sort();
    tokens.dedup();

    assert_eq!(tokens.len(), 32);
    assert_eq!(container.resolve::<AtomicUsize>().unwrap().load(Ordering::SeqCst), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_property_added_while_resolving_is_picked_up() {
    let module = GlobalPropertyModule::new();
    module.add_property("Token", "initial".to_string()).unwrap();
    let container = Arc::new(container(&module));

    let resolver = {
        let container = Arc::clone(&container);
        tokio::spawn(async move {
            for _ in 0..100 {
                let token = container.resolve::<Session>().unwrap().token.clone();
                assert!(token == "initial" || token == "updated");
            }
        })
    };
    module.add_property("Token", "updated".to_string()).unwrap();
    resolver.await.unwrap();

    assert_eq!(container.resolve::<Session>().unwrap().token, "updated");
}
