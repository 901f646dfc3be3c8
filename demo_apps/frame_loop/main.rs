//! Frame Loop Demo
//!
//! Drives a headless renderer through a few frames the way a game would:
//!
//! - pass 0: a culling compute layer
//! - pass 1: a scene render layer fed by two producer threads, plus an
//!   unordered particle layer that is only filled every other frame
//! - pass 2: a bloom post-process chain, recorded once
//!
//! Per-frame statistics are handed to a reporter thread through a ring
//! buffer.
//!
//! Run with `RUST_LOG=info cargo run -p frame_loop`.

use std::sync::Arc;

use anyhow::{Result, bail};
use stratum::resources::{
    BlendMode, PixelFormat, Shader, ShaderDesc, ShaderStage, Surface, SurfaceDesc, VertexBuffer,
    VertexBufferDesc,
};
use stratum::stratum_render::backend::FrameStats;
use stratum::{
    ComputeLayer, ConstantBufferCache, DispatchStatus, Handle, HeadlessBackend, Layer, LayerDesc,
    LayerDispatcher, ParameterBlock, PostProcessItem, PostProcessLayer, RenderContext, RenderKey,
    RenderLayer, RenderSettings, RingBuffer, SortMode,
};

const FRAMES: u32 = 8;
const PRODUCERS: usize = 2;
const OBJECTS_PER_PRODUCER: u32 = 64;

enum Report {
    Frame(u32, FrameStats),
    Done,
}

struct SceneResources {
    vertex_shader: Handle<Shader>,
    pixel_shader: Handle<Shader>,
    compute_shader: Handle<Shader>,
    mesh: Handle<VertexBuffer>,
    hdr: Handle<Surface>,
    bloom: Handle<Surface>,
}

struct Layers {
    cull: Arc<Layer>,
    scene: Arc<Layer>,
    particles: Arc<Layer>,
}

fn shader(ctx: &mut RenderContext<HeadlessBackend>, name: &str, stage: ShaderStage) -> Handle<Shader> {
    ctx.create(
        name,
        ShaderDesc {
            stage,
            bytecode: Arc::from(name.as_bytes()),
            ..Default::default()
        },
    )
}

fn create_resources(ctx: &mut RenderContext<HeadlessBackend>) -> Result<SceneResources> {
    let resources = SceneResources {
        vertex_shader: shader(ctx, "mesh.vs", ShaderStage::Vertex),
        pixel_shader: shader(ctx, "mesh.ps", ShaderStage::Pixel),
        compute_shader: shader(ctx, "cull.cs", ShaderStage::Compute),
        mesh: ctx.create(
            "cube",
            VertexBufferDesc {
                num_elements: 24,
                element_size: 32,
                ..Default::default()
            },
        ),
        hdr: ctx.create("hdr", SurfaceDesc::render_target(1280, 720, PixelFormat::Rgba16Float)),
        bloom: ctx.create("bloom", SurfaceDesc::render_target(640, 360, PixelFormat::Rgba16Float)),
    };

    if !resources.mesh.is_valid() || !resources.hdr.is_valid() || !resources.bloom.is_valid() {
        bail!("failed to create scene resources");
    }
    Ok(resources)
}

fn create_layers(
    ctx: &RenderContext<HeadlessBackend>,
    dispatcher: &mut LayerDispatcher,
    res: &SceneResources,
) -> Layers {
    let cull = Arc::new(Layer::from(ComputeLayer::new(
        LayerDesc::ordered("cull", 0),
        ctx.queue_config(SortMode::None),
    )));
    let scene = Arc::new(Layer::from(RenderLayer::new(
        LayerDesc::ordered("scene", 1),
        PRODUCERS,
        ctx.queue_config(SortMode::Ascending),
    )));
    let particles = Arc::new(Layer::from(ComputeLayer::new(
        LayerDesc::unordered("particles", 1),
        ctx.queue_config(SortMode::None),
    )));

    let bloom = PostProcessLayer::new(LayerDesc::ordered("bloom", 2));
    bloom.create(vec![
        PostProcessItem {
            input: res.hdr,
            output: res.bloom,
            pixel_shader: res.pixel_shader,
            ..Default::default()
        },
        PostProcessItem {
            input: res.bloom,
            output: res.hdr,
            pixel_shader: res.pixel_shader,
            blend: BlendMode::Additive,
            ..Default::default()
        },
    ]);

    dispatcher.add_layer(Arc::clone(&cull));
    dispatcher.add_layer(Arc::clone(&scene));
    dispatcher.add_layer(Arc::clone(&particles));
    dispatcher.add_layer(Arc::new(Layer::from(bloom)));

    Layers { cull, scene, particles }
}

fn fill_compute(layer: &Layer, shader: Handle<Shader>, groups: u32) {
    let Some(compute) = layer.as_compute() else {
        return;
    };
    let mut queue = compute.queue();
    queue.begin();
    if let Some(item) = queue.create_item() {
        item.shader = shader;
        item.groups = [groups, 1, 1];
    }
    queue.end(ParameterBlock::default(), &[]);
}

fn fill_scene_queue(layer: &Layer, index: usize, frame: u32, res: &SceneResources) {
    let Some(mut queue) = layer.as_render().and_then(|render| render.queue(index)) else {
        return;
    };
    queue.begin();
    for object in 0..OBJECTS_PER_PRODUCER {
        let Some(item) = queue.create_item() else {
            break;
        };
        let depth = ((object * 31 + frame * 7) % 100) as f32;
        item.key = RenderKey::new(0, object % 4, depth);
        item.program.vertex = res.vertex_shader;
        item.program.pixel = res.pixel_shader;
        item.vertex_buffers[0] = res.mesh;
    }
    queue.end(ParameterBlock::default(), &[]);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut ctx = RenderContext::new(HeadlessBackend::new(), RenderSettings::default());
    ctx.init()?;

    let res = create_resources(&mut ctx)?;
    let mut cbuffers = ConstantBufferCache::new();
    {
        let (backend, resources) = ctx.split_mut();
        cbuffers.load(backend, resources)?;
    }

    let mut dispatcher = ctx.new_dispatcher();
    let layers = create_layers(&ctx, &mut dispatcher, &res);

    let (mut reports, mut inbox) = RingBuffer::with_capacity(FRAMES as usize + 1);
    let reporter = std::thread::spawn(move || {
        loop {
            match inbox.try_pop() {
                Some(Report::Frame(frame, stats)) => log::info!(
                    "frame {frame}: {} layers, {} draws, {} dispatches, {} post passes, {} state changes, {} uploads",
                    stats.layers,
                    stats.draw_calls,
                    stats.dispatches,
                    stats.post_process_passes,
                    stats.state_changes,
                    stats.uploads
                ),
                Some(Report::Done) => break,
                None => std::thread::yield_now(),
            }
        }
    });

    for frame in 0..FRAMES {
        ctx.backend_mut().begin_frame();

        // Per-frame constants; identical frames skip the upload.
        let constants = [(frame / 2) as u8; 64];
        {
            let (backend, resources) = ctx.split_mut();
            cbuffers.upload(backend, resources, 0, &constants);
        }

        std::thread::scope(|scope| {
            for index in 0..PRODUCERS {
                let scene = &layers.scene;
                let res = &res;
                scope.spawn(move || fill_scene_queue(scene, index, frame, res));
            }
            fill_compute(&layers.cull, res.compute_shader, 64);
            if frame % 2 == 0 {
                fill_compute(&layers.particles, res.compute_shader, 16);
            }
        });

        match ctx.dispatch(&mut dispatcher)? {
            DispatchStatus::Complete => {}
            DispatchStatus::Stalled { pass, pending } => {
                log::warn!("frame {frame}: stalled on pass {pass} ({pending} pending), dropping frame");
                dispatcher.reset_progress();
            }
        }

        let mut report = Report::Frame(frame, ctx.backend().stats());
        while let Err(rejected) = reports.try_push(report) {
            report = rejected;
            std::thread::yield_now();
        }
    }

    let mut done = Report::Done;
    while let Err(rejected) = reports.try_push(done) {
        done = rejected;
        std::thread::yield_now();
    }
    if reporter.join().is_err() {
        bail!("reporter thread panicked");
    }

    {
        let (backend, resources) = ctx.split_mut();
        cbuffers.unload(backend, resources);
    }
    ctx.shutdown();
    Ok(())
}
