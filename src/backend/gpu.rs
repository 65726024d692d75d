//! GPU presentation with wgpu.
//!
//! Frames are uploaded as-is into a texture; the fragment shader recovers
//! alpha from the packed halves, applies the tint and writes premultiplied
//! colour over a transparent clear.

use std::num::NonZeroU64;

use crate::buffer::{FrameGeometry, PixelBuffer};
use crate::config::SurfaceConfig;
use crate::error::{Error, FormatError, Result};
use crate::layout::{AlphaLayout, Rect};
use crate::surface::{DisplaySurface, FrameSlot, Presentation, SurfaceState};
use crate::types::{PixelFormat, Size};

pub(crate) const SHADER: &str = include_str!("shaders/alpha.wgsl");

const PARAMS_SIZE: u64 = 64;

/// Uniforms of `shaders/alpha.wgsl`, four `vec4<f32>`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Params {
    rect: [f32; 4],
    halves: [f32; 4],
    tint_color: [f32; 4],
    tint_tone: [f32; 4],
}

impl Params {
    fn new(config: &SurfaceConfig, layout: AlphaLayout, dest: Rect, view: Size) -> Self {
        let (vw, vh) = (view.width as f32, view.height as f32);
        let rect = [
            dest.x / vw * 2.0 - 1.0,
            1.0 - dest.y / vh * 2.0,
            (dest.x + dest.width) / vw * 2.0 - 1.0,
            1.0 - (dest.y + dest.height) / vh * 2.0,
        ];
        let halves = match layout {
            AlphaLayout::AlphaLeftColorRight => [0.5, 0.0, 0.5, 1.0],
            AlphaLayout::ColorLeftAlphaRight => [0.0, 0.5, 0.5, 1.0],
            AlphaLayout::Embedded => [0.0, 0.0, 1.0, 0.0],
        };
        let (tint_color, tint_tone) = match &config.tint {
            Some(t) => (
                [t.hue, t.saturation, t.value, 1.0],
                [t.shadow, t.gamma, t.in_low, t.mix_origin],
            ),
            None => ([0.0; 4], [0.0; 4]),
        };
        Params {
            rect,
            halves,
            tint_color,
            tint_tone,
        }
    }

    fn to_bytes(self) -> [u8; PARAMS_SIZE as usize] {
        let mut out = [0u8; PARAMS_SIZE as usize];
        let values = self
            .rect
            .iter()
            .chain(&self.halves)
            .chain(&self.tint_color)
            .chain(&self.tint_tone);
        for (chunk, v) in out.chunks_exact_mut(4).zip(values) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        out
    }
}

fn texture_format(format: PixelFormat) -> std::result::Result<wgpu::TextureFormat, FormatError> {
    match format {
        PixelFormat::Bgra32 => Ok(wgpu::TextureFormat::Bgra8Unorm),
        PixelFormat::Rgba32 => Ok(wgpu::TextureFormat::Rgba8Unorm),
        other => Err(FormatError::UnsupportedPixelFormat(other)),
    }
}

/// The uploaded frame. Kept across frames of the same size and format.
struct FrameTexture {
    size: Size,
    format: wgpu::TextureFormat,
    layout: AlphaLayout,
    displayed: Size,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// A [`DisplaySurface`] drawing with a host-provided wgpu device.
///
/// [`redraw`](Self::redraw) renders into any texture with the target format
/// given at construction, so the surface can be embedded in a host's own
/// render loop. See [`WindowSurface`] for a surface that owns its swapchain.
pub struct GpuSurface {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params: wgpu::Buffer,
    texture: Option<FrameTexture>,
    config: SurfaceConfig,
    slot: FrameSlot,
}

impl GpuSurface {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
        config: SurfaceConfig,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("alpha_surface_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("alpha_surface_params"),
            size: PARAMS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("alpha_surface_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(PARAMS_SIZE),
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("alpha_surface_shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("alpha_surface_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("alpha_surface_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    // One layer over a transparent clear.
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        GpuSurface {
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            params,
            texture: None,
            config,
            slot: FrameSlot::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next frame and redraw.
    pub fn set_config(&mut self, config: SurfaceConfig) {
        self.config = config;
    }

    fn ensure_texture(&mut self, geometry: &FrameGeometry, format: wgpu::TextureFormat) {
        if let Some(current) = &mut self.texture
            && current.size == geometry.source
            && current.format == format
        {
            current.layout = geometry.layout;
            current.displayed = geometry.displayed;
            return;
        }

        tracing::debug!(
            width = geometry.source.width,
            height = geometry.source.height,
            ?format,
            "allocating frame texture"
        );
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("alpha_surface_frame"),
            size: wgpu::Extent3d {
                width: geometry.source.width,
                height: geometry.source.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("alpha_surface_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params.as_entire_binding(),
                },
            ],
        });
        self.texture = Some(FrameTexture {
            size: geometry.source,
            format,
            layout: geometry.layout,
            displayed: geometry.displayed,
            texture,
            bind_group,
        });
    }

    /// Render the current state into `target` and submit.
    ///
    /// `target` must have the format given to [`GpuSurface::new`] and
    /// `RENDER_ATTACHMENT` usage.
    pub fn redraw(&mut self, target: &wgpu::Texture) -> Presentation {
        let view_size = Size::new(target.width(), target.height());
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let frame = self
            .texture
            .as_ref()
            .filter(|_| self.slot.drawable(self.config.skip_leading_frames));
        if let Some(frame) = frame {
            let dest = self.config.scale_mode.fit(frame.displayed, view_size);
            let params = Params::new(&self.config, frame.layout, dest, view_size);
            self.queue.write_buffer(&self.params, 0, &params.to_bytes());
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("alpha_surface_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("alpha_surface_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(frame) = frame {
                rp.set_pipeline(&self.pipeline);
                rp.set_bind_group(0, &frame.bind_group, &[]);
                rp.draw(0..4, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));

        let presentation = match frame {
            Some(_) => self.slot.presented(),
            None => Presentation::Cleared,
        };
        tracing::trace!(?presentation, "redraw");
        presentation
    }
}

impl DisplaySurface for GpuSurface {
    type Error = Error;

    fn display_frame<B>(&mut self, buffer: &B) -> Result<()>
    where
        B: PixelBuffer + ?Sized,
    {
        let max = self.device.limits().max_texture_dimension_2d;
        let checked = FrameGeometry::inspect(buffer, self.config.layout).and_then(|geometry| {
            if geometry.source.width > max || geometry.source.height > max {
                return Err(FormatError::TooLarge {
                    size: geometry.source,
                    max,
                });
            }
            let bytes_per_row = u32::try_from(geometry.bytes_per_row).map_err(|_| {
                FormatError::TooLarge {
                    size: geometry.source,
                    max,
                }
            })?;
            Ok((geometry, bytes_per_row, texture_format(geometry.pixel_format)?))
        });
        let (geometry, bytes_per_row, format) =
            checked.inspect_err(|err| tracing::warn!(%err, "dropping frame"))?;
        // `inspect` guarantees exactly one plane.
        let data = buffer.planes()[0].data;

        self.ensure_texture(&geometry, format);
        let Some(frame) = &self.texture else {
            return Err(Error::Gpu("frame texture missing after allocation".into()));
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(geometry.source.height),
            },
            wgpu::Extent3d {
                width: geometry.source.width,
                height: geometry.source.height,
                depth_or_array_layers: 1,
            },
        );
        self.slot.accept();

        tracing::debug!(
            width = geometry.displayed.width,
            height = geometry.displayed.height,
            format = ?geometry.pixel_format,
            "frame uploaded"
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.slot.clear();
    }

    fn state(&self) -> SurfaceState {
        self.slot.state()
    }
}

fn swapchain_extent(view: Size, max_dimension: u32) -> Option<Size> {
    if view.is_empty() {
        return None;
    }
    Some(Size::new(
        view.width.min(max_dimension),
        view.height.min(max_dimension),
    ))
}

/// A [`GpuSurface`] presenting to a window through its own swapchain.
pub struct WindowSurface {
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    inner: GpuSurface,
}

impl WindowSurface {
    /// Create a device for `window` and configure a transparent swapchain.
    ///
    /// Blocks until the adapter and device are ready.
    pub fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        view: Size,
        config: SurfaceConfig,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::Gpu(format!("failed to create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| Error::Gpu(format!("wgpu request_adapter failed: {e:?}")))?;
        tracing::info!(adapter = ?adapter.get_info(), "gpu adapter selected");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("alpha_surface_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| Error::Gpu(format!("wgpu request_device failed: {e:?}")))?;

        let max_dimension = device.limits().max_texture_dimension_2d;
        let caps = surface.get_capabilities(&adapter);
        // Frames are already sRGB-encoded; an sRGB target would encode twice.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("surface reports no formats".into()))?;
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::Inherit,
        ]
        .into_iter()
        .find(|m| caps.alpha_modes.contains(m))
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: view.width.clamp(1, max_dimension),
            height: view.height.clamp(1, max_dimension),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);
        tracing::info!(?format, ?alpha_mode, "window surface configured");

        Ok(WindowSurface {
            surface,
            surface_config,
            inner: GpuSurface::new(device, queue, format, config),
        })
    }

    pub fn gpu(&self) -> &GpuSurface {
        &self.inner
    }

    pub fn gpu_mut(&mut self) -> &mut GpuSurface {
        &mut self.inner
    }

    /// Resize the swapchain. Empty sizes are ignored and each side is clamped
    /// to the device's texture limit.
    pub fn resize(&mut self, view: Size) {
        let max = self.inner.device().limits().max_texture_dimension_2d;
        let Some(extent) = swapchain_extent(view, max) else {
            return;
        };
        if extent != view {
            tracing::debug!(?view, max, "clamping swapchain to the texture limit");
        }
        self.surface_config.width = extent.width;
        self.surface_config.height = extent.height;
        self.surface.configure(self.inner.device(), &self.surface_config);
    }

    /// Draw the current state and present it.
    pub fn present(&mut self) -> Result<Presentation> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                tracing::debug!("swapchain outdated, reconfiguring");
                self.surface.configure(self.inner.device(), &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| Error::Gpu(format!("failed to acquire frame: {e}")))?
            }
            Err(e) => return Err(Error::Gpu(format!("failed to acquire frame: {e}"))),
        };
        let presentation = self.inner.redraw(&frame.texture);
        frame.present();
        Ok(presentation)
    }
}

impl DisplaySurface for WindowSurface {
    type Error = Error;

    fn display_frame<B>(&mut self, buffer: &B) -> Result<()>
    where
        B: PixelBuffer + ?Sized,
    {
        self.inner.display_frame(buffer)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn state(&self) -> SurfaceState {
        self.inner.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BorrowedPixelBuffer;
    use crate::layout::ScaleMode;
    use crate::tint::TintParams;

    #[test]
    fn shader_parses_and_validates() {
        let module = naga::front::wgsl::parse_str(SHADER).unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .unwrap();
    }

    #[test]
    fn full_view_maps_to_clip_space_corners() {
        let view = Size::new(100, 50);
        let dest = ScaleMode::Stretch.fit(Size::new(10, 10), view);
        let params = Params::new(&SurfaceConfig::default(), AlphaLayout::Embedded, dest, view);
        assert_eq!(params.rect, [-1.0, 1.0, 1.0, -1.0]);
        assert_eq!(params.halves, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(params.tint_color[3], 0.0);
    }

    #[test]
    fn letterboxed_quad_and_packed_halves() {
        let view = Size::new(200, 200);
        let dest = ScaleMode::AspectFit.fit(Size::new(100, 50), view);
        let config = SurfaceConfig::default().with_tint(TintParams::with_hue(0.25));
        let params = Params::new(&config, AlphaLayout::AlphaLeftColorRight, dest, view);
        assert_eq!(params.rect, [-1.0, 0.5, 1.0, -0.5]);
        assert_eq!(params.halves, [0.5, 0.0, 0.5, 1.0]);
        assert_eq!(params.tint_color, [0.25, 1.0, 1.1, 1.0]);
    }

    #[test]
    fn params_pack_little_endian_in_order() {
        let params = Params {
            rect: [1.0, 2.0, 3.0, 4.0],
            halves: [5.0; 4],
            tint_color: [6.0; 4],
            tint_tone: [7.0, 0.0, 0.0, 8.0],
        };
        let bytes = params.to_bytes();
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &4.0f32.to_le_bytes());
        assert_eq!(&bytes[16..20], &5.0f32.to_le_bytes());
        assert_eq!(&bytes[60..64], &8.0f32.to_le_bytes());
    }

    #[test]
    fn only_packed_rgb_maps_to_a_texture_format() {
        assert_eq!(
            texture_format(PixelFormat::Bgra32),
            Ok(wgpu::TextureFormat::Bgra8Unorm)
        );
        assert_eq!(
            texture_format(PixelFormat::Nv12),
            Err(FormatError::UnsupportedPixelFormat(PixelFormat::Nv12))
        );
    }

    fn headless(config: SurfaceConfig) -> GpuSurface {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::NOOP,
            backend_options: wgpu::BackendOptions {
                noop: wgpu::NoopBackendOptions { enable: true },
                ..Default::default()
            },
            ..Default::default()
        });
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .unwrap();
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
                .unwrap();
        GpuSurface::new(device, queue, wgpu::TextureFormat::Rgba8Unorm, config)
    }

    fn target(surface: &GpuSurface) -> wgpu::Texture {
        surface.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("test_target"),
            size: wgpu::Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    fn embedded() -> SurfaceConfig {
        SurfaceConfig::default().with_layout(AlphaLayout::Embedded)
    }

    #[test]
    fn display_redraw_clear_cycle() {
        let mut surface = headless(embedded());
        let target = target(&surface);
        assert_eq!(surface.state(), SurfaceState::Empty);
        assert_eq!(surface.redraw(&target), Presentation::Cleared);

        let data = [7u8; 16];
        let buf = BorrowedPixelBuffer::packed(PixelFormat::Rgba32, Size::new(2, 2), &data, 8);
        surface.display_frame(&buf).unwrap();
        assert_eq!(surface.state(), SurfaceState::Displaying);
        assert_eq!(surface.redraw(&target), Presentation::Frame { first: true });
        assert_eq!(surface.redraw(&target), Presentation::Frame { first: false });

        surface.clear();
        assert_eq!(surface.state(), SurfaceState::Empty);
        assert_eq!(surface.redraw(&target), Presentation::Cleared);

        surface.display_frame(&buf).unwrap();
        assert_eq!(surface.redraw(&target), Presentation::Frame { first: true });
    }

    #[test]
    fn rejected_frames_leave_the_current_one() {
        let mut surface = headless(embedded());
        let target = target(&surface);
        let data = [7u8; 16];
        let buf = BorrowedPixelBuffer::packed(PixelFormat::Rgba32, Size::new(2, 2), &data, 8);
        surface.display_frame(&buf).unwrap();

        let max = surface.device().limits().max_texture_dimension_2d;
        let wide = vec![0u8; (max as usize + 1) * 4];
        let buf = BorrowedPixelBuffer::packed(
            PixelFormat::Rgba32,
            Size::new(max + 1, 1),
            &wide,
            wide.len(),
        );
        let err = surface.display_frame(&buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::TooLarge { max: m, .. }) if m == max
        ));

        let nv12 = [0u8; 6];
        let buf = BorrowedPixelBuffer::packed(PixelFormat::Nv12, Size::new(2, 2), &nv12, 2);
        assert!(surface.display_frame(&buf).is_err());

        assert_eq!(surface.state(), SurfaceState::Displaying);
        let frame = surface.texture.as_ref().unwrap();
        assert_eq!(frame.size, Size::new(2, 2));
        assert_eq!(surface.redraw(&target), Presentation::Frame { first: true });
    }

    #[test]
    fn rejected_first_frame_keeps_the_surface_empty() {
        let mut surface = headless(SurfaceConfig::default());
        let data = [0u8; 12];
        // Odd width cannot be split into mask and colour halves.
        let buf = BorrowedPixelBuffer::packed(PixelFormat::Bgra32, Size::new(3, 1), &data, 12);
        assert!(surface.display_frame(&buf).is_err());
        assert_eq!(surface.state(), SurfaceState::Empty);
        assert!(surface.texture.is_none());
    }

    #[test]
    fn texture_is_reused_until_size_or_format_changes() {
        let mut surface = headless(embedded());
        let data = [1u8; 16];
        let rgba = BorrowedPixelBuffer::packed(PixelFormat::Rgba32, Size::new(2, 2), &data, 8);
        surface.display_frame(&rgba).unwrap();
        let first = surface.texture.as_ref().unwrap().texture.clone();

        surface.display_frame(&rgba).unwrap();
        assert_eq!(surface.texture.as_ref().unwrap().texture, first);

        let bgra = BorrowedPixelBuffer::packed(PixelFormat::Bgra32, Size::new(2, 2), &data, 8);
        surface.display_frame(&bgra).unwrap();
        let frame = surface.texture.as_ref().unwrap();
        assert_ne!(frame.texture, first);
        assert_eq!(frame.format, wgpu::TextureFormat::Bgra8Unorm);

        let small = BorrowedPixelBuffer::packed(PixelFormat::Bgra32, Size::new(1, 1), &data, 4);
        surface.display_frame(&small).unwrap();
        assert_eq!(surface.texture.as_ref().unwrap().size, Size::new(1, 1));
    }

    #[test]
    fn leading_frames_are_held_back() {
        let mut surface = headless(embedded().with_skip_leading_frames(1));
        let target = target(&surface);
        let data = [1u8; 4];
        let buf = BorrowedPixelBuffer::packed(PixelFormat::Rgba32, Size::new(1, 1), &data, 4);
        surface.display_frame(&buf).unwrap();
        assert_eq!(surface.redraw(&target), Presentation::Cleared);
        surface.display_frame(&buf).unwrap();
        assert_eq!(surface.redraw(&target), Presentation::Frame { first: true });
    }

    #[test]
    fn swapchain_is_clamped_to_the_texture_limit() {
        assert_eq!(swapchain_extent(Size::new(0, 10), 8192), None);
        assert_eq!(
            swapchain_extent(Size::new(640, 480), 8192),
            Some(Size::new(640, 480))
        );
        assert_eq!(
            swapchain_extent(Size::new(u32::MAX, 9000), 8192),
            Some(Size::new(8192, 8192))
        );
    }
}
