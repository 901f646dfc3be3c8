//! Queue Tests
//!
//! Tests for:
//! - Queue lifecycle: Uninitialized → Queueing → Ready → Executed → Queueing
//! - Rejection of out-of-order calls
//! - Key sorting (RenderKey ascending, custom keys descending)
//! - Shared parameters and dependencies recorded by `end()`

use stratum::resources::{BindType, Handle, ShaderStage, ShaderVariable};
use stratum::{
    ComputeItem, Dependency, ParameterBlock, Queue, QueueConfig, QueueState, RenderItem,
    RenderKey, SortMode,
};

fn texture_var(slot: u32) -> ShaderVariable {
    ShaderVariable::new(BindType::Surface, ShaderStage::Pixel, slot, 0, false)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn queue_full_cycle_in_order() {
    let mut queue: Queue<RenderItem> = Queue::new(QueueConfig::default());
    let mut observed = vec![queue.state()];

    assert!(queue.begin());
    observed.push(queue.state());
    assert!(queue.create_item().is_some());
    assert!(queue.end(ParameterBlock::default(), &[]));
    observed.push(queue.state());
    assert!(queue.tag_executed());
    observed.push(queue.state());
    assert!(queue.begin());
    observed.push(queue.state());

    assert_eq!(
        observed,
        vec![
            QueueState::Uninitialized,
            QueueState::Queueing,
            QueueState::Ready,
            QueueState::Executed,
            QueueState::Queueing,
        ]
    );
}

#[test]
fn queue_rejects_calls_out_of_order() {
    let mut queue: Queue<RenderItem> = Queue::new(QueueConfig::default());

    assert!(!queue.end(ParameterBlock::default(), &[]));
    assert!(queue.create_item().is_none());
    assert_eq!(queue.state(), QueueState::Uninitialized);

    queue.begin();
    assert!(!queue.tag_executed());
    assert_eq!(queue.state(), QueueState::Queueing);

    queue.end(ParameterBlock::default(), &[]);
    assert!(queue.create_item().is_none());
    assert!(!queue.end(ParameterBlock::default(), &[]));
    assert_eq!(queue.state(), QueueState::Ready);
}

#[test]
fn queue_begin_drops_previous_frame() {
    let mut queue: Queue<ComputeItem> = Queue::new(QueueConfig::default());
    queue.begin();
    for _ in 0..5 {
        queue.create_item();
    }
    queue.end(ParameterBlock::default(), &[]);
    queue.tag_executed();

    queue.begin();
    queue.create_item();
    queue.end(ParameterBlock::default(), &[]);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.items().count(), 1);
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn render_queue_sorts_by_render_key() {
    let mut queue: Queue<RenderItem> = Queue::new(QueueConfig::sorted(SortMode::Ascending));
    queue.begin();
    let keys = [
        RenderKey::new(2, 0, 1.0),
        RenderKey::new(1, 5, 9.0),
        RenderKey::new(1, 5, 2.0),
        RenderKey::new(1, 0, 100.0),
    ];
    for key in keys {
        queue.create_item().unwrap().key = key;
    }
    queue.end(ParameterBlock::default(), &[]);

    let sorted: Vec<RenderKey> = queue.iter_sorted().map(|item| item.key).collect();
    assert_eq!(sorted, vec![keys[3], keys[2], keys[1], keys[0]]);
    assert_eq!(queue.item(0).map(|item| item.key), Some(keys[0]));
}

#[test]
fn queue_resort_uses_new_keys_each_frame() {
    let mut queue: Queue<ComputeItem> = Queue::new(QueueConfig::sorted(SortMode::Descending));

    for frame in 0..3u64 {
        queue.begin();
        for i in 0..6u64 {
            queue.create_item().unwrap().key = (i * 7 + frame * 3) % 11;
        }
        queue.end(ParameterBlock::default(), &[]);

        let sorted: Vec<u64> = queue.iter_sorted().map(|item| item.key).collect();
        let mut expected = sorted.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sorted, expected, "frame {frame}");
        queue.tag_executed();
    }
}

// ============================================================================
// Shared data
// ============================================================================

#[test]
fn queue_end_records_shared_parameters_and_dependencies() {
    let mut queue: Queue<RenderItem> = Queue::new(QueueConfig::default());
    let mut shared = ParameterBlock::new();
    shared.set_surface(texture_var(0), Handle::from_raw(3));
    let shadow_map = Dependency {
        variable: texture_var(1),
        surface: Handle::from_raw(8),
    };

    queue.begin();
    queue.end(shared.clone(), &[shadow_map]);

    assert_eq!(queue.shared_parameters(), Some(&shared));
    assert_eq!(queue.dependencies(), &[shadow_map]);

    queue.tag_executed();
    assert!(queue.shared_parameters().is_none());
    assert!(queue.dependencies().is_empty());
}
