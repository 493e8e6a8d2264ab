//! # The Renderer Facade and Frame Scheduler
//!
//! The producer-facing surface of the command queue, plus the dedicated
//! render thread and the strict ping-pong that keeps the two sides at
//! most one frame apart.
//!
//! ## Handoff protocol
//!
//! Two [`FrameContext`]s rotate through two bounded(1) channels:
//!
//! ```text
//! frame N:   sim ──(context carrying frame N)──► render
//!            sim ◄──(context from frame N-2)──── render   [at pickup]
//! ```
//!
//! The render thread hands its previous context back the moment it picks
//! up the next one, which it only does after finishing the previous
//! frame. `frame()` therefore returns once the render thread has
//! finished frame N-1 and accepted frame N: single-frame pipelining, by
//! construction, with no shared mutable state.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use ember_core::{Color4, HandleTable, Mat4, RawHandle, Rect};

use crate::backend::RenderBackend;
use crate::config::RendererConfig;
use crate::dispatcher::CommandDispatcher;
use crate::frame::FrameContext;
use crate::limits::{
    MAX_GPU_PROGRAMS, MAX_INDEX_BUFFERS, MAX_RENDER_TARGETS, MAX_SHADERS, MAX_TEXTURES,
    MAX_UNIFORMS, MAX_UNIFORM_NAME_LENGTH, MAX_VERTEX_BUFFERS,
};
use crate::protocol::Command;
use crate::resource::{
    GpuProgramId, IndexBufferId, PixelFormat, RenderTargetId, ShaderId, ShaderType, StockUniform,
    TextureId, UniformId, UniformType, VertexBufferId, VertexFormat,
};
use crate::stats::RenderStats;

/// The command queue's producer-facing entry point.
///
/// Owns the handle tables (simulation-thread-only), the submit context,
/// and the render thread. Every resource-affecting call is validated
/// against its table *here*, at submission time, before anything is
/// encoded - malformed programs fail fast, on the thread that made the
/// mistake.
///
/// Construction spawns the render thread and blocks until the backend
/// device exists; [`shutdown`](Self::shutdown) (or drop) tears it down.
pub struct Renderer {
    vertex_buffers: HandleTable,
    index_buffers: HandleTable,
    textures: HandleTable,
    shaders: HandleTable,
    gpu_programs: HandleTable,
    uniforms: HandleTable,
    render_targets: HandleTable,

    /// The context this thread is recording into. `None` only transiently
    /// inside `frame()` and permanently after shutdown.
    submit: Option<Box<FrameContext>>,
    to_render: Sender<Box<FrameContext>>,
    from_render: Receiver<Box<FrameContext>>,
    thread: Option<JoinHandle<()>>,
    stats: Arc<Mutex<RenderStats>>,
    running: bool,
}

impl Renderer {
    /// Starts a renderer over `backend` with the default configuration.
    ///
    /// Returns only after the render thread has executed backend device
    /// creation.
    #[must_use]
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self::with_config(backend, &RendererConfig::default())
    }

    /// Starts a renderer over `backend` with an explicit configuration.
    ///
    /// Returns only after the render thread has executed backend device
    /// creation.
    ///
    /// # Panics
    ///
    /// Panics if the render thread cannot be spawned.
    #[must_use]
    pub fn with_config(backend: Box<dyn RenderBackend>, config: &RendererConfig) -> Self {
        let make_context = || {
            Box::new(FrameContext::new(
                config.command_stream_capacity,
                config.constant_stream_capacity,
                config.draw_call_capacity,
            ))
        };

        let (to_render, render_incoming) = bounded::<Box<FrameContext>>(1);
        let (render_outgoing, from_render) = bounded::<Box<FrameContext>>(1);
        let stats = Arc::new(Mutex::new(RenderStats::default()));

        let dispatcher = CommandDispatcher::new(backend);
        let resident = make_context();
        let thread_stats = Arc::clone(&stats);
        let slow_frame_warn_ms = config.slow_frame_warn_ms;

        let handle = thread::spawn(move || {
            render_loop(
                dispatcher,
                &render_incoming,
                &render_outgoing,
                resident,
                &thread_stats,
                slow_frame_warn_ms,
            );
        });

        let mut renderer = Self {
            vertex_buffers: HandleTable::new(MAX_VERTEX_BUFFERS),
            index_buffers: HandleTable::new(MAX_INDEX_BUFFERS),
            textures: HandleTable::new(MAX_TEXTURES),
            shaders: HandleTable::new(MAX_SHADERS),
            gpu_programs: HandleTable::new(MAX_GPU_PROGRAMS),
            uniforms: HandleTable::new(MAX_UNIFORMS),
            render_targets: HandleTable::new(MAX_RENDER_TARGETS),
            submit: Some(make_context()),
            to_render,
            from_render,
            thread: Some(handle),
            stats,
            running: true,
        };

        // Startup handshake. The first frame carries Init; the second
        // cannot complete its handoff until the render thread has fully
        // executed the first, so device creation is forced before the
        // constructor returns.
        renderer.submit_mut().record(&Command::Init);
        renderer.frame();
        renderer.frame();

        tracing::info!("Renderer up, backend initialized");
        renderer
    }

    // =========================================================================
    // FRAME PACING
    // =========================================================================

    /// Ends the simulation tick's recording: hands the submit context to
    /// the render thread and blocks until the render thread has finished
    /// the previous frame.
    ///
    /// # Panics
    ///
    /// Panics if called after [`shutdown`](Self::shutdown), or if the
    /// render thread died (a backend invariant violation - fatal).
    pub fn frame(&mut self) {
        assert!(self.running, "frame() called after shutdown()");

        let mut context = self.submit.take().expect("Submit context missing");
        context.finish();

        self.to_render
            .send(context)
            .expect("Render thread disconnected");
        let recycled = self
            .from_render
            .recv()
            .expect("Render thread disconnected");

        self.submit = Some(recycled);
    }

    /// Stops the render thread: enqueues the backend teardown, performs
    /// one final handshake, and joins. Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;

        if let Some(mut context) = self.submit.take() {
            context.record(&Command::Shutdown);
            context.finish();
            if self.to_render.send(context).is_ok() {
                // The render thread hands the previous context back when
                // it picks the shutdown frame up.
                let _ = self.from_render.recv();
            }
        }

        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::warn!("Render thread panicked before shutdown completed");
            }
        }

        tracing::info!("Renderer shut down");
    }

    /// Snapshot of the render thread's statistics.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        *self.stats.lock()
    }

    // =========================================================================
    // VERTEX BUFFERS
    // =========================================================================

    /// Creates a vertex buffer holding `count` vertices of `format`,
    /// filled from `data`.
    ///
    /// # Panics
    ///
    /// Panics if the vertex buffer table is exhausted.
    pub fn create_vertex_buffer(
        &mut self,
        count: u32,
        format: VertexFormat,
        data: &[u8],
    ) -> VertexBufferId {
        let id = VertexBufferId::from_raw(create_handle(&mut self.vertex_buffers, "Vertex buffer"));
        self.submit_mut().record(&Command::CreateVertexBuffer {
            id,
            count,
            format,
            data,
        });
        id
    }

    /// Creates a dynamic vertex buffer with storage for `count` vertices
    /// of `format`; fill it with
    /// [`update_vertex_buffer`](Self::update_vertex_buffer).
    ///
    /// # Panics
    ///
    /// Panics if the vertex buffer table is exhausted.
    pub fn create_dynamic_vertex_buffer(
        &mut self,
        count: u32,
        format: VertexFormat,
    ) -> VertexBufferId {
        let id = VertexBufferId::from_raw(create_handle(&mut self.vertex_buffers, "Vertex buffer"));
        self.submit_mut()
            .record(&Command::CreateDynamicVertexBuffer { id, count, format });
        id
    }

    /// Overwrites `count` vertices of `id` starting at `offset`. The data
    /// must match the format given at creation time.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live vertex buffer.
    pub fn update_vertex_buffer(
        &mut self,
        id: VertexBufferId,
        offset: u32,
        count: u32,
        data: &[u8],
    ) {
        assert!(
            self.vertex_buffers.has(id.raw()),
            "Vertex buffer does not exist"
        );
        self.submit_mut().record(&Command::UpdateVertexBuffer {
            id,
            offset,
            count,
            data,
        });
    }

    /// Destroys vertex buffer `id`. The slot is free for reuse
    /// immediately; the backend object dies when this frame executes.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live vertex buffer.
    pub fn destroy_vertex_buffer(&mut self, id: VertexBufferId) {
        assert!(
            self.vertex_buffers.has(id.raw()),
            "Vertex buffer does not exist"
        );
        self.vertex_buffers.destroy(id.raw());
        self.submit_mut()
            .record(&Command::DestroyVertexBuffer { id });
    }

    // =========================================================================
    // INDEX BUFFERS
    // =========================================================================

    /// Creates an index buffer holding `count` indices from `data`.
    ///
    /// # Panics
    ///
    /// Panics if the index buffer table is exhausted.
    pub fn create_index_buffer(&mut self, count: u32, data: &[u8]) -> IndexBufferId {
        let id = IndexBufferId::from_raw(create_handle(&mut self.index_buffers, "Index buffer"));
        self.submit_mut()
            .record(&Command::CreateIndexBuffer { id, count, data });
        id
    }

    /// Creates a dynamic index buffer with storage for `count` indices.
    ///
    /// # Panics
    ///
    /// Panics if the index buffer table is exhausted.
    pub fn create_dynamic_index_buffer(&mut self, count: u32) -> IndexBufferId {
        let id = IndexBufferId::from_raw(create_handle(&mut self.index_buffers, "Index buffer"));
        self.submit_mut()
            .record(&Command::CreateDynamicIndexBuffer { id, count });
        id
    }

    /// Overwrites `count` indices of `id` starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live index buffer.
    pub fn update_index_buffer(&mut self, id: IndexBufferId, offset: u32, count: u32, data: &[u8]) {
        assert!(
            self.index_buffers.has(id.raw()),
            "Index buffer does not exist"
        );
        self.submit_mut().record(&Command::UpdateIndexBuffer {
            id,
            offset,
            count,
            data,
        });
    }

    /// Destroys index buffer `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live index buffer.
    pub fn destroy_index_buffer(&mut self, id: IndexBufferId) {
        assert!(
            self.index_buffers.has(id.raw()),
            "Index buffer does not exist"
        );
        self.index_buffers.destroy(id.raw());
        self.submit_mut().record(&Command::DestroyIndexBuffer { id });
    }

    // =========================================================================
    // TEXTURES
    // =========================================================================

    /// Creates a `width` x `height` texture of `format` from `data`.
    ///
    /// # Panics
    ///
    /// Panics if the texture table is exhausted.
    pub fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: &[u8],
    ) -> TextureId {
        let id = TextureId::from_raw(create_handle(&mut self.textures, "Texture"));
        self.submit_mut().record(&Command::CreateTexture {
            id,
            width,
            height,
            format,
            data,
        });
        id
    }

    /// Overwrites the `(x, y, width, height)` region of texture `id`.
    /// The data must match the format given at creation time.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live texture.
    pub fn update_texture(
        &mut self,
        id: TextureId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        assert!(self.textures.has(id.raw()), "Texture does not exist");
        self.submit_mut().record(&Command::UpdateTexture {
            id,
            x,
            y,
            width,
            height,
            data,
        });
    }

    /// Destroys texture `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live texture.
    pub fn destroy_texture(&mut self, id: TextureId) {
        assert!(self.textures.has(id.raw()), "Texture does not exist");
        self.textures.destroy(id.raw());
        self.submit_mut().record(&Command::DestroyTexture { id });
    }

    // =========================================================================
    // SHADERS AND PROGRAMS
    // =========================================================================

    /// Creates a shader for stage `ty` from an opaque `source` blob
    /// (text or bytecode - whatever the resource loader produced).
    ///
    /// # Panics
    ///
    /// Panics if the shader table is exhausted.
    pub fn create_shader(&mut self, ty: ShaderType, source: &[u8]) -> ShaderId {
        let id = ShaderId::from_raw(create_handle(&mut self.shaders, "Shader"));
        self.submit_mut()
            .record(&Command::CreateShader { id, ty, source });
        id
    }

    /// Destroys shader `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live shader.
    pub fn destroy_shader(&mut self, id: ShaderId) {
        assert!(self.shaders.has(id.raw()), "Shader does not exist");
        self.shaders.destroy(id.raw());
        self.submit_mut().record(&Command::DestroyShader { id });
    }

    /// Links a GPU program from `vertex` and `fragment`.
    ///
    /// # Panics
    ///
    /// Panics if either shader is not live, or the program table is
    /// exhausted.
    pub fn create_gpu_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> GpuProgramId {
        assert!(self.shaders.has(vertex.raw()), "Vertex shader does not exist");
        assert!(
            self.shaders.has(fragment.raw()),
            "Fragment shader does not exist"
        );

        let id = GpuProgramId::from_raw(create_handle(&mut self.gpu_programs, "GPU program"));
        self.submit_mut().record(&Command::CreateGpuProgram {
            id,
            vertex,
            fragment,
        });
        id
    }

    /// Destroys GPU program `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live GPU program.
    pub fn destroy_gpu_program(&mut self, id: GpuProgramId) {
        assert!(self.gpu_programs.has(id.raw()), "GPU program does not exist");
        self.gpu_programs.destroy(id.raw());
        self.submit_mut().record(&Command::DestroyGpuProgram { id });
    }

    // =========================================================================
    // UNIFORMS
    // =========================================================================

    /// Declares a uniform named `name` with storage for exactly `num`
    /// elements of `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is a stock uniform name or longer than
    /// [`MAX_UNIFORM_NAME_LENGTH`] bytes, if `ty` is the `End` sentinel,
    /// or if the uniform table is exhausted.
    pub fn create_uniform(&mut self, name: &str, ty: UniformType, num: u8) -> UniformId {
        assert!(
            StockUniform::from_name(name).is_none(),
            "Uniform name '{name}' is a stock uniform"
        );
        assert!(
            name.len() <= MAX_UNIFORM_NAME_LENGTH,
            "Max uniform name length is {MAX_UNIFORM_NAME_LENGTH}"
        );
        assert!(
            ty != UniformType::End,
            "The End sentinel is not a uniform type"
        );

        let id = UniformId::from_raw(create_handle(&mut self.uniforms, "Uniform"));
        self.submit_mut()
            .record(&Command::CreateUniform { id, name, ty, num });
        id
    }

    /// Destroys uniform `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live uniform.
    pub fn destroy_uniform(&mut self, id: UniformId) {
        assert!(self.uniforms.has(id.raw()), "Uniform does not exist");
        self.uniforms.destroy(id.raw());
        self.submit_mut().record(&Command::DestroyUniform { id });
    }

    // =========================================================================
    // PER-DRAW STATE
    // =========================================================================

    /// Sets the render state flags for the current draw.
    pub fn set_state(&mut self, flags: u64) {
        self.submit_mut().set_state(flags);
    }

    /// Sets the pose (model matrix) for the current draw.
    pub fn set_pose(&mut self, pose: Mat4) {
        self.submit_mut().set_pose(pose);
    }

    /// Binds GPU program `id` to the current draw.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live GPU program.
    pub fn set_program(&mut self, id: GpuProgramId) {
        assert!(self.gpu_programs.has(id.raw()), "GPU program does not exist");
        self.submit_mut().set_program(id);
    }

    /// Binds vertex buffer `id` to the current draw.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live vertex buffer.
    pub fn set_vertex_buffer(&mut self, id: VertexBufferId) {
        assert!(
            self.vertex_buffers.has(id.raw()),
            "Vertex buffer does not exist"
        );
        self.submit_mut().set_vertex_buffer(id);
    }

    /// Binds index buffer `id` to the current draw, drawing `count`
    /// indices starting at `start` (`u32::MAX` means all).
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live index buffer.
    pub fn set_index_buffer(&mut self, id: IndexBufferId, start: u32, count: u32) {
        assert!(
            self.index_buffers.has(id.raw()),
            "Index buffer does not exist"
        );
        self.submit_mut().set_index_buffer(id, start, count);
    }

    /// Sets the value of uniform `id` for this frame. `data` must be
    /// exactly `ty.element_size() * num` bytes as declared at creation -
    /// a contract this core does not re-check.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live uniform, or `ty` is the `End`
    /// sentinel.
    pub fn set_uniform(&mut self, id: UniformId, ty: UniformType, data: &[u8]) {
        assert!(self.uniforms.has(id.raw()), "Uniform does not exist");
        self.submit_mut().set_uniform(id, ty, data);
    }

    /// Binds `texture` to texture unit `unit`, feeding sampler uniform
    /// `sampler`.
    ///
    /// # Panics
    ///
    /// Panics if `sampler` or `texture` is not live, or `unit` is out of
    /// range.
    pub fn set_texture(&mut self, unit: u8, sampler: UniformId, texture: TextureId, flags: u32) {
        assert!(self.uniforms.has(sampler.raw()), "Uniform does not exist");
        assert!(self.textures.has(texture.raw()), "Texture does not exist");
        self.submit_mut().set_texture(unit, sampler, texture, flags);
    }

    /// Commits the current draw against `layer` and resets the scratch
    /// state.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    pub fn commit(&mut self, layer: u8) {
        self.submit_mut().commit(layer);
    }

    // =========================================================================
    // PER-LAYER STATE
    // =========================================================================

    /// Routes `layer` into offscreen render target `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live render target. Render target creation
    /// is a declared future extension, so today every id fails this check.
    pub fn set_layer_render_target(&mut self, layer: u8, id: RenderTargetId) {
        assert!(
            self.render_targets.has(id.raw()),
            "Render target does not exist"
        );
        self.submit_mut().set_layer_render_target(layer, id);
    }

    /// Sets the clear behavior of `layer`.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    pub fn set_layer_clear(&mut self, layer: u8, flags: u8, color: Color4, depth: f32) {
        self.submit_mut().set_layer_clear(layer, flags, color, depth);
    }

    /// Sets the view matrix of `layer`.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    pub fn set_layer_view(&mut self, layer: u8, view: Mat4) {
        self.submit_mut().set_layer_view(layer, view);
    }

    /// Sets the projection matrix of `layer`.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    pub fn set_layer_projection(&mut self, layer: u8, projection: Mat4) {
        self.submit_mut().set_layer_projection(layer, projection);
    }

    /// Sets the viewport rectangle of `layer`.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    pub fn set_layer_viewport(&mut self, layer: u8, viewport: Rect) {
        self.submit_mut().set_layer_viewport(layer, viewport);
    }

    /// Sets the scissor rectangle of `layer`.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    pub fn set_layer_scissor(&mut self, layer: u8, scissor: Rect) {
        self.submit_mut().set_layer_scissor(layer, scissor);
    }

    fn submit_mut(&mut self) -> &mut FrameContext {
        self.submit
            .as_mut()
            .expect("Renderer used after shutdown")
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Allocates from `table` or dies with the capacity message.
fn create_handle(table: &mut HandleTable, kind: &str) -> RawHandle {
    let capacity = table.capacity();
    table
        .create()
        .unwrap_or_else(|| panic!("{kind} table exhausted ({capacity} slots)"))
}

/// The render thread's main loop.
///
/// Holds a resident context at all times. Each iteration: pick up the
/// next submitted frame, hand the previous (already reset) context back,
/// execute, apply constants, render, reset. Exits once the dispatcher
/// has observed `Shutdown`, or the producer side is gone.
fn render_loop(
    mut dispatcher: CommandDispatcher,
    incoming: &Receiver<Box<FrameContext>>,
    outgoing: &Sender<Box<FrameContext>>,
    mut resident: Box<FrameContext>,
    stats: &Arc<Mutex<RenderStats>>,
    slow_frame_warn_ms: f32,
) {
    tracing::debug!("Render thread started");

    while dispatcher.is_running() {
        let Ok(next) = incoming.recv() else {
            // Producer dropped without shutdown (e.g. a simulation-thread
            // panic mid-frame). Nothing left to execute.
            break;
        };

        let previous = std::mem::replace(&mut resident, next);
        if outgoing.send(previous).is_err() {
            break;
        }

        let start = Instant::now();
        let executed = dispatcher.execute(&resident);
        let applied = dispatcher.apply_constants(&resident);
        dispatcher.render(&resident);
        let frame_time_ms = start.elapsed().as_secs_f32() * 1000.0;

        if frame_time_ms > slow_frame_warn_ms {
            tracing::warn!("Slow render frame: {frame_time_ms:.2}ms");
        }

        {
            let mut s = stats.lock();
            s.frames += 1;
            s.commands_executed += u64::from(executed);
            s.constants_applied = applied;
            #[allow(clippy::cast_possible_truncation)]
            {
                s.draw_calls = resident.draw_calls().len() as u32;
            }
            s.frame_time_ms = frame_time_ms;
        }

        resident.reset();
    }

    tracing::debug!("Render thread stopped");
}
