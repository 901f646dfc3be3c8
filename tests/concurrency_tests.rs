//! Concurrency Tests
//!
//! Tests for:
//! - Producers filling separate queues of one render layer in parallel
//! - Dispatch waiting for a producer running on another thread
//! - Frame-to-frame reuse of queues across threads

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use stratum::resources::{Shader, ShaderDesc};
use stratum::{
    DispatchSettings, Handle, HeadlessBackend, IdleStrategy, Layer, LayerDesc, LayerDispatcher,
    LayerState, ParameterBlock, QueueConfig, RenderKey, RenderLayer, ResourceManager, SortMode,
};

const PRODUCERS: usize = 4;
const ITEMS_PER_PRODUCER: usize = 250;

fn setup() -> (HeadlessBackend, ResourceManager, Handle<Shader>) {
    let mut backend = HeadlessBackend::new();
    let mut resources = ResourceManager::default();
    let shader = resources.create_shader(
        &mut backend,
        "vs",
        ShaderDesc {
            bytecode: Arc::from(&[0u8; 4][..]),
            ..Default::default()
        },
    );
    (backend, resources, shader)
}

fn produce(layer: &Layer, index: usize, shader: Handle<Shader>) {
    let render = layer.as_render().unwrap();
    let mut queue = render.queue(index).unwrap();
    assert!(queue.begin());
    for i in 0..ITEMS_PER_PRODUCER {
        let item = queue.create_item().unwrap();
        item.key = RenderKey::new(0, (ITEMS_PER_PRODUCER - i) as u32, 0.0);
        item.program.vertex = shader;
    }
    assert!(queue.end(ParameterBlock::default(), &[]));
}

// ============================================================================
// Parallel producers
// ============================================================================

#[test]
fn producers_fill_separate_queues_in_parallel() {
    let (mut backend, resources, shader) = setup();
    let layer = Arc::new(Layer::from(RenderLayer::new(
        LayerDesc::ordered("scene", 0),
        PRODUCERS,
        QueueConfig::sorted(SortMode::Ascending),
    )));
    let mut dispatcher = LayerDispatcher::new();
    dispatcher.add_layer(Arc::clone(&layer));

    for _frame in 0..3 {
        std::thread::scope(|scope| {
            for index in 0..PRODUCERS {
                let layer = &layer;
                scope.spawn(move || produce(layer, index, shader));
            }
        });
        assert_eq!(layer.state(), LayerState::Ready);

        backend.begin_frame();
        assert!(dispatcher.dispatch(&mut backend, &resources).is_complete());
        assert_eq!(backend.stats().draw_calls, PRODUCERS * ITEMS_PER_PRODUCER);
        assert_eq!(layer.state(), LayerState::Executed);
    }

    // Within each queue the draws come out in key order.
    for queue in 0..PRODUCERS {
        let keys: Vec<u64> = backend
            .commands()
            .iter()
            .filter(|command| command.queue == queue)
            .map(|command| command.key)
            .collect();
        assert_eq!(keys.len(), ITEMS_PER_PRODUCER);
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}

#[test]
fn dispatch_waits_for_producer_on_another_thread() {
    let (mut backend, resources, shader) = setup();
    let layer = Arc::new(Layer::from(RenderLayer::new(
        LayerDesc::ordered("late", 0),
        1,
        QueueConfig::default(),
    )));
    let mut dispatcher = LayerDispatcher::with_settings(DispatchSettings {
        max_idle_rounds: u32::MAX,
        idle: IdleStrategy::Yield,
    });
    dispatcher.add_layer(Arc::clone(&layer));

    let started = Arc::new(AtomicBool::new(false));
    let producer = {
        let layer = Arc::clone(&layer);
        let started = Arc::clone(&started);
        std::thread::spawn(move || {
            started.store(true, Ordering::Release);
            std::thread::sleep(std::time::Duration::from_millis(20));
            produce(&layer, 0, shader);
        })
    };

    while !started.load(Ordering::Acquire) {
        std::thread::yield_now();
    }
    assert!(dispatcher.dispatch(&mut backend, &resources).is_complete());
    producer.join().unwrap();

    assert_eq!(backend.execution_order(), vec!["late"]);
    assert_eq!(backend.stats().draw_calls, ITEMS_PER_PRODUCER);
}

#[test]
fn queue_state_is_visible_without_taking_the_lock() {
    let layer = RenderLayer::new(LayerDesc::ordered("scene", 0), 2, QueueConfig::default());
    let writer = layer.queue(0).unwrap();

    // The aggregate state reads the atomic mirrors while queue 0 is held.
    assert_eq!(layer.state(), LayerState::Uninitialized);
    drop(writer);

    assert!(layer.begin_all());
    assert_eq!(layer.state(), LayerState::Queueing);
}
