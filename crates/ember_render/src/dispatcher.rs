//! # Command Dispatcher
//!
//! The render-thread state machine: decodes one command record at a time
//! and invokes the matching backend operation, then drains the constant
//! stream, then (once the backend device exists) runs the frame's render
//! pass.
//!
//! The opcode match is exhaustive over the [`Command`] sum type - the
//! compiler guarantees every opcode has a handler. The only runtime
//! protocol fault left is an unrecognized byte on the wire, which aborts
//! inside the decoder.

use crate::backend::{FrameView, RenderBackend};
use crate::frame::FrameContext;
use crate::protocol::{Command, ConstantReader};
use ember_core::StreamReader;

/// Replays decoded frames into a [`RenderBackend`].
///
/// Owned by the render thread; nothing here is shared with the
/// simulation thread.
pub struct CommandDispatcher {
    backend: Box<dyn RenderBackend>,
    /// True between `Init` and `Shutdown` - the backend device exists.
    initialized: bool,
    /// Cleared by `Shutdown`; the consumer loop exits when this drops.
    running: bool,
}

impl CommandDispatcher {
    /// Wraps a backend. The dispatcher starts not-initialized and running.
    #[must_use]
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            backend,
            initialized: false,
            running: true,
        }
    }

    /// True once `Init` has executed and until `Shutdown` does.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// False once `Shutdown` has executed.
    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Decodes and executes `context`'s command stream up to its `End`
    /// record. Returns the number of commands executed (excluding `End`).
    #[allow(clippy::too_many_lines)]
    pub fn execute(&mut self, context: &FrameContext) -> u32 {
        let mut reader = StreamReader::new(context.command_bytes());
        let mut executed = 0u32;

        loop {
            match Command::decode(&mut reader) {
                Command::Init => {
                    tracing::info!("Render backend init");
                    self.backend.init();
                    self.initialized = true;
                }
                Command::Shutdown => {
                    tracing::info!("Render backend shutdown");
                    self.backend.shutdown();
                    self.initialized = false;
                    self.running = false;
                }
                Command::CreateVertexBuffer {
                    id,
                    count,
                    format,
                    data,
                } => self.backend.create_vertex_buffer(id, count, format, data),
                Command::CreateDynamicVertexBuffer { id, count, format } => {
                    self.backend.create_dynamic_vertex_buffer(id, count, format);
                }
                Command::UpdateVertexBuffer {
                    id,
                    offset,
                    count,
                    data,
                } => self.backend.update_vertex_buffer(id, offset, count, data),
                Command::DestroyVertexBuffer { id } => self.backend.destroy_vertex_buffer(id),
                Command::CreateIndexBuffer { id, count, data } => {
                    self.backend.create_index_buffer(id, count, data);
                }
                Command::CreateDynamicIndexBuffer { id, count } => {
                    self.backend.create_dynamic_index_buffer(id, count);
                }
                Command::UpdateIndexBuffer {
                    id,
                    offset,
                    count,
                    data,
                } => self.backend.update_index_buffer(id, offset, count, data),
                Command::DestroyIndexBuffer { id } => self.backend.destroy_index_buffer(id),
                Command::CreateTexture {
                    id,
                    width,
                    height,
                    format,
                    data,
                } => self.backend.create_texture(id, width, height, format, data),
                Command::UpdateTexture {
                    id,
                    x,
                    y,
                    width,
                    height,
                    data,
                } => self.backend.update_texture(id, x, y, width, height, data),
                Command::DestroyTexture { id } => self.backend.destroy_texture(id),
                Command::CreateShader { id, ty, source } => {
                    self.backend.create_shader(id, ty, source);
                }
                Command::DestroyShader { id } => self.backend.destroy_shader(id),
                Command::CreateGpuProgram {
                    id,
                    vertex,
                    fragment,
                } => self.backend.create_gpu_program(id, vertex, fragment),
                Command::DestroyGpuProgram { id } => self.backend.destroy_gpu_program(id),
                Command::CreateUniform { id, name, ty, num } => {
                    self.backend.create_uniform(id, name, ty, num);
                }
                Command::DestroyUniform { id } => self.backend.destroy_uniform(id),
                Command::End => break,
            }

            executed += 1;
        }

        executed
    }

    /// Empties `context`'s constant stream into backend uniform updates.
    /// Returns the number of records applied.
    pub fn apply_constants(&mut self, context: &FrameContext) -> u32 {
        let mut applied = 0u32;
        for record in ConstantReader::new(context.constant_bytes()) {
            self.backend.update_uniform(record.id, record.ty, record.data);
            applied += 1;
        }
        applied
    }

    /// Runs the backend's per-frame render pass over the executed frame.
    /// Skipped while the backend device does not exist.
    pub fn render(&mut self, context: &FrameContext) {
        if self.initialized {
            self.backend.render(&FrameView::new(context));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{UniformType, VertexFormat};
    use crate::resource::{UniformId, VertexBufferId};
    use ember_core::RawHandle;
    use std::sync::{Arc, Mutex};

    /// Records the order of backend calls by name.
    struct TraceBackend {
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl TraceBackend {
        fn push(&self, event: impl Into<String>) {
            self.trace.lock().unwrap().push(event.into());
        }
    }

    impl RenderBackend for TraceBackend {
        fn init(&mut self) {
            self.push("init");
        }
        fn shutdown(&mut self) {
            self.push("shutdown");
        }
        fn render(&mut self, frame: &FrameView<'_>) {
            self.push(format!("render[{}]", frame.draws.len()));
        }
        fn create_vertex_buffer(
            &mut self,
            _id: VertexBufferId,
            count: u32,
            _format: VertexFormat,
            data: &[u8],
        ) {
            self.push(format!("create_vb[{count},{}]", data.len()));
        }
        fn create_dynamic_vertex_buffer(
            &mut self,
            _id: VertexBufferId,
            count: u32,
            _format: VertexFormat,
        ) {
            self.push(format!("create_dyn_vb[{count}]"));
        }
        fn update_vertex_buffer(
            &mut self,
            _id: VertexBufferId,
            offset: u32,
            count: u32,
            _data: &[u8],
        ) {
            self.push(format!("update_vb[{offset},{count}]"));
        }
        fn destroy_vertex_buffer(&mut self, _id: VertexBufferId) {
            self.push("destroy_vb");
        }
        fn create_index_buffer(&mut self, _id: crate::resource::IndexBufferId, count: u32, _data: &[u8]) {
            self.push(format!("create_ib[{count}]"));
        }
        fn create_dynamic_index_buffer(&mut self, _id: crate::resource::IndexBufferId, count: u32) {
            self.push(format!("create_dyn_ib[{count}]"));
        }
        fn update_index_buffer(
            &mut self,
            _id: crate::resource::IndexBufferId,
            offset: u32,
            count: u32,
            _data: &[u8],
        ) {
            self.push(format!("update_ib[{offset},{count}]"));
        }
        fn destroy_index_buffer(&mut self, _id: crate::resource::IndexBufferId) {
            self.push("destroy_ib");
        }
        fn create_texture(
            &mut self,
            _id: crate::resource::TextureId,
            width: u32,
            height: u32,
            _format: crate::resource::PixelFormat,
            _data: &[u8],
        ) {
            self.push(format!("create_tex[{width}x{height}]"));
        }
        fn update_texture(
            &mut self,
            _id: crate::resource::TextureId,
            x: u32,
            y: u32,
            width: u32,
            height: u32,
            _data: &[u8],
        ) {
            self.push(format!("update_tex[{x},{y},{width},{height}]"));
        }
        fn destroy_texture(&mut self, _id: crate::resource::TextureId) {
            self.push("destroy_tex");
        }
        fn create_shader(
            &mut self,
            _id: crate::resource::ShaderId,
            _ty: crate::resource::ShaderType,
            source: &[u8],
        ) {
            self.push(format!("create_shader[{}]", source.len()));
        }
        fn destroy_shader(&mut self, _id: crate::resource::ShaderId) {
            self.push("destroy_shader");
        }
        fn create_gpu_program(
            &mut self,
            _id: crate::resource::GpuProgramId,
            _vertex: crate::resource::ShaderId,
            _fragment: crate::resource::ShaderId,
        ) {
            self.push("create_program");
        }
        fn destroy_gpu_program(&mut self, _id: crate::resource::GpuProgramId) {
            self.push("destroy_program");
        }
        fn create_uniform(&mut self, _id: UniformId, name: &str, _ty: UniformType, num: u8) {
            self.push(format!("create_uniform[{name},{num}]"));
        }
        fn update_uniform(&mut self, _id: UniformId, _ty: UniformType, data: &[u8]) {
            self.push(format!("update_uniform[{}]", data.len()));
        }
        fn destroy_uniform(&mut self, _id: UniformId) {
            self.push("destroy_uniform");
        }
    }

    fn dispatcher() -> (CommandDispatcher, Arc<Mutex<Vec<String>>>) {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let backend = TraceBackend {
            trace: Arc::clone(&trace),
        };
        (CommandDispatcher::new(Box::new(backend)), trace)
    }

    #[test]
    fn test_execute_dispatches_in_order() {
        let (mut dispatcher, trace) = dispatcher();
        let mut ctx = FrameContext::new(256, 64, 8);

        let vb = VertexBufferId::from_raw(RawHandle::new(1, 0));
        ctx.record(&Command::Init);
        ctx.record(&Command::CreateVertexBuffer {
            id: vb,
            count: 3,
            format: VertexFormat::Position3,
            data: &[0u8; 36],
        });
        ctx.record(&Command::DestroyVertexBuffer { id: vb });
        ctx.finish();

        let executed = dispatcher.execute(&ctx);

        assert_eq!(executed, 3);
        assert!(dispatcher.is_initialized());
        assert!(dispatcher.is_running());
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["init", "create_vb[3,36]", "destroy_vb"]
        );
    }

    #[test]
    fn test_shutdown_stops_the_machine() {
        let (mut dispatcher, trace) = dispatcher();
        let mut ctx = FrameContext::new(64, 64, 4);

        ctx.record(&Command::Init);
        ctx.finish();
        let _ = dispatcher.execute(&ctx);
        ctx.reset();

        ctx.record(&Command::Shutdown);
        ctx.finish();
        let _ = dispatcher.execute(&ctx);

        assert!(!dispatcher.is_initialized());
        assert!(!dispatcher.is_running());
        assert_eq!(*trace.lock().unwrap(), vec!["init", "shutdown"]);
    }

    #[test]
    fn test_render_skipped_until_initialized() {
        let (mut dispatcher, trace) = dispatcher();
        let mut ctx = FrameContext::new(64, 64, 4);
        ctx.finish();

        dispatcher.render(&ctx); // Not initialized - must not reach the backend
        assert!(trace.lock().unwrap().is_empty());

        ctx.reset();
        ctx.record(&Command::Init);
        ctx.finish();
        let _ = dispatcher.execute(&ctx);
        dispatcher.render(&ctx);

        assert_eq!(*trace.lock().unwrap(), vec!["init", "render[0]"]);
    }

    #[test]
    fn test_constants_applied_before_render() {
        let (mut dispatcher, trace) = dispatcher();
        let mut ctx = FrameContext::new(64, 128, 4);

        ctx.record(&Command::Init);
        ctx.set_uniform(
            UniformId::from_raw(RawHandle::new(0, 0)),
            UniformType::Float4,
            &[0u8; 16],
        );
        ctx.commit(0);
        ctx.finish();

        let _ = dispatcher.execute(&ctx);
        let applied = dispatcher.apply_constants(&ctx);
        dispatcher.render(&ctx);

        assert_eq!(applied, 1);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["init", "update_uniform[16]", "render[1]"]
        );
    }
}
