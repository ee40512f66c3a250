//! wgpu Backend
//!
//! [`WgpuBackend`] owns the device, queue and window surface and executes the
//! frames recorded by a [`DrawContext`](crate::render::context::DrawContext).
//!
//! # Constant buffers
//!
//! Constant buffers exist on the CPU only (see [`ConstantStore`]). At submit
//! time the frame's packed snapshots are uploaded into one uniform arena with a
//! single `write_buffer`, and every draw selects its snapshot through a dynamic
//! offset. Bind groups 0..=2 are the three constant slots; textured shaders add
//! group 3 (texture at binding 0, sampler at binding 1).
//!
//! # Pipelines
//!
//! Pipelines are created lazily per `(shader, topology)` pair before the render
//! pass starts and cached until the shader is released.

use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroU64;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use slotmap::SlotMap;
use wgpu::util::DeviceExt;

use crate::errors::{LanternError, ResourceKind, Result, StartupStage};
use crate::render::backend::{BufferId, ConstantBufferId, RenderBackend, ShaderId, TextureData, TextureId};
use crate::render::constants::{CONSTANT_SLOT_COUNT, CONSTANT_SLOT_SIZES, MAX_CONSTANT_BUFFER_SIZE, TEXTURE_SLOT};
use crate::render::context::{ConstantStore, FrameData};
use crate::render::shader::{FRAGMENT_ENTRY, ShaderDesc, VERTEX_ENTRY};
use crate::render::vertex::{InputLayout, Topology};
use crate::settings::RenderSettings;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_ARENA_SIZE: u64 = 64 * MAX_CONSTANT_BUFFER_SIZE as u64;

struct GpuShader {
    label: String,
    module: wgpu::ShaderModule,
    layout: InputLayout,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Per-frame uniform storage addressed with dynamic offsets.
struct UniformArena {
    buffer: wgpu::Buffer,
    capacity: u64,
    bind_groups: [wgpu::BindGroup; CONSTANT_SLOT_COUNT],
}

impl UniformArena {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Constant Arena"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_groups = std::array::from_fn(|slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Constant Slot"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: NonZeroU64::new(CONSTANT_SLOT_SIZES[slot]),
                    }),
                }],
            })
        });
        Self {
            buffer,
            capacity,
            bind_groups,
        }
    }

    /// Uploads `staging`, growing the arena first if it does not fit.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout, staging: &[u8]) {
        let needed = staging.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::info!("Growing constant arena from {} to {} bytes", self.capacity, capacity);
            *self = Self::new(device, layout, capacity);
        }
        queue.write_buffer(&self.buffer, 0, staging);
    }
}

/// GPU backend on top of wgpu.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    clear_color: wgpu::Color,
    cull_mode: Option<wgpu::Face>,
    polygon_mode: wgpu::PolygonMode,

    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    arena: UniformArena,
    fallback_texture: GpuTexture,

    buffers: SlotMap<BufferId, wgpu::Buffer>,
    textures: SlotMap<TextureId, GpuTexture>,
    shaders: SlotMap<ShaderId, GpuShader>,
    pipelines: HashMap<(ShaderId, Topology), wgpu::RenderPipeline>,
    constants: ConstantStore,
}

impl WgpuBackend {
    /// Creates the device and configures `window`'s surface.
    ///
    /// Errors carry the startup stage they belong to: adapter and device
    /// failures are [`StartupStage::Device`], surface failures
    /// [`StartupStage::RenderTarget`].
    pub async fn new<W>(window: W, settings: &RenderSettings, width: u32, height: u32) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| LanternError::SurfaceError(e.to_string()).at_stage(StartupStage::RenderTarget))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| LanternError::AdapterRequestFailed(e.to_string()).at_stage(StartupStage::Device))?;

        let mut required_features = wgpu::Features::empty();
        let polygon_mode = if settings.wireframe {
            if adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE) {
                required_features |= wgpu::Features::POLYGON_MODE_LINE;
                wgpu::PolygonMode::Line
            } else {
                log::warn!("Wireframe requested but not supported by the adapter; drawing solid");
                wgpu::PolygonMode::Fill
            }
        } else {
            wgpu::PolygonMode::Fill
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lantern Device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await
            .map_err(|e| LanternError::from(e).at_stage(StartupStage::Device))?;

        let mut config = surface.get_default_config(&adapter, width, height).ok_or_else(|| {
            LanternError::SurfaceError("Surface not supported by adapter".to_string())
                .at_stage(StartupStage::RenderTarget)
        })?;
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);
        let depth_view = Self::create_depth_texture(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Constant Slot Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Repeat Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let arena = UniformArena::new(&device, &uniform_layout, INITIAL_ARENA_SIZE);
        let fallback_texture =
            Self::upload_texture(&device, &queue, &texture_layout, &sampler, "Fallback White", &TextureData::white());

        log::info!(
            "wgpu backend ready: {}x{} {:?}, {:?}",
            config.width,
            config.height,
            config.format,
            adapter.get_info().backend
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            clear_color: settings.wgpu_clear_color(),
            cull_mode: settings.cull_mode.to_wgpu(),
            polygon_mode,
            uniform_layout,
            texture_layout,
            sampler,
            arena,
            fallback_texture,
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            pipelines: HashMap::new(),
            constants: ConstantStore::new(),
        })
    }

    fn create_depth_texture(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn upload_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        label: &str,
        data: &TextureData,
    ) -> GpuTexture {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        GpuTexture {
            _texture: texture,
            bind_group,
        }
    }

    /// Returns the current surface dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn ensure_pipeline(&mut self, shader: ShaderId, topology: Topology) -> Result<()> {
        if self.pipelines.contains_key(&(shader, topology)) {
            return Ok(());
        }
        let gpu_shader = self
            .shaders
            .get(shader)
            .ok_or(LanternError::ResourceNotFound { kind: ResourceKind::Shader })?;

        let mut groups = vec![Some(&self.uniform_layout); CONSTANT_SLOT_COUNT];
        if gpu_shader.layout.is_textured() {
            debug_assert_eq!(groups.len(), TEXTURE_SLOT as usize);
            groups.push(Some(&self.texture_layout));
        }
        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&gpu_shader.label),
            bind_group_layouts: &groups,
            immediate_size: 0,
        });

        let line_mode = topology == Topology::LineList;
        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&gpu_shader.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &gpu_shader.module,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[gpu_shader.layout.buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &gpu_shader.module,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: topology.into(),
                front_face: wgpu::FrontFace::Cw,
                cull_mode: if line_mode { None } else { self.cull_mode },
                polygon_mode: if line_mode { wgpu::PolygonMode::Fill } else { self.polygon_mode },
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        log::debug!("Created pipeline for '{}' ({topology:?})", gpu_shader.label);
        self.pipelines.insert((shader, topology), pipeline);
        Ok(())
    }

    fn create_buffer(&mut self, kind: ResourceKind, label: &str, data: &[u8], usage: wgpu::BufferUsages) -> Result<BufferId> {
        if data.is_empty() {
            return Err(LanternError::ResourceCreation {
                kind,
                label: label.to_string(),
                reason: "empty buffer".to_string(),
            });
        }
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: data,
            usage,
        });
        Ok(self.buffers.insert(buffer))
    }
}

impl RenderBackend for WgpuBackend {
    fn create_vertex_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferId> {
        self.create_buffer(ResourceKind::VertexBuffer, label, data, wgpu::BufferUsages::VERTEX)
    }

    fn create_index_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferId> {
        // Index data must be 4-byte aligned for upload.
        if data.len() % 4 == 0 {
            self.create_buffer(ResourceKind::IndexBuffer, label, data, wgpu::BufferUsages::INDEX)
        } else {
            let mut padded = data.to_vec();
            padded.resize(data.len().next_multiple_of(4), 0);
            self.create_buffer(ResourceKind::IndexBuffer, label, &padded, wgpu::BufferUsages::INDEX)
        }
    }

    fn create_constant_buffer(&mut self, label: &str, size: usize) -> Result<ConstantBufferId> {
        if size == 0 || size > MAX_CONSTANT_BUFFER_SIZE {
            return Err(LanternError::ResourceCreation {
                kind: ResourceKind::ConstantBuffer,
                label: label.to_string(),
                reason: format!("size {size} outside 1..={MAX_CONSTANT_BUFFER_SIZE}"),
            });
        }
        Ok(self.constants.insert(label, size))
    }

    fn create_texture(&mut self, label: &str, data: &TextureData) -> Result<TextureId> {
        let max = self.device.limits().max_texture_dimension_2d;
        if !data.is_consistent() || data.width > max || data.height > max {
            return Err(LanternError::ResourceCreation {
                kind: ResourceKind::Texture,
                label: label.to_string(),
                reason: format!("invalid {}x{} texture", data.width, data.height),
            });
        }
        let texture = Self::upload_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            label,
            data,
        );
        Ok(self.textures.insert(texture))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId> {
        desc.validate()?;
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&desc.label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&desc.source)),
        });
        Ok(self.shaders.insert(GpuShader {
            label: desc.label.clone(),
            module,
            layout: desc.layout,
        }))
    }

    fn release_buffer(&mut self, id: BufferId) {
        if let Some(buffer) = self.buffers.remove(id) {
            buffer.destroy();
        }
    }

    fn release_constant_buffer(&mut self, id: ConstantBufferId) {
        self.constants.remove(id);
    }

    fn release_texture(&mut self, id: TextureId) {
        self.textures.remove(id);
    }

    fn release_shader(&mut self, id: ShaderId) {
        if self.shaders.remove(id).is_some() {
            self.pipelines.retain(|(shader, _), _| *shader != id);
        }
    }

    fn constants(&mut self) -> &mut ConstantStore {
        &mut self.constants
    }

    fn submit(&mut self, frame: FrameData) -> Result<()> {
        for draw in &frame.draws {
            self.ensure_pipeline(draw.shader, draw.topology)?;
        }
        self.arena
            .upload(&self.device, &self.queue, &self.uniform_layout, &frame.staging);

        let output = match self.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost => {
                self.resize(self.config.width, self.config.height);
                return Ok(());
            }
            e => return Err(LanternError::SurfaceError(format!("{e:?}"))),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &frame.draws {
                let Some(pipeline) = self.pipelines.get(&(draw.shader, draw.topology)) else {
                    continue;
                };
                let (Some(vertices), Some(indices)) =
                    (self.buffers.get(draw.vertex.buffer), self.buffers.get(draw.index.buffer))
                else {
                    log::warn!("Skipping draw with released geometry buffers");
                    continue;
                };

                pass.set_pipeline(pipeline);
                for (slot, snapshot) in draw.constants.iter().enumerate() {
                    let offset = snapshot.map_or(0, |s| s.offset);
                    pass.set_bind_group(slot as u32, &self.arena.bind_groups[slot], &[offset]);
                }
                if draw.layout.is_textured() {
                    let texture = draw
                        .texture
                        .and_then(|t| self.textures.get(t))
                        .unwrap_or(&self.fallback_texture);
                    pass.set_bind_group(TEXTURE_SLOT, &texture.bind_group, &[]);
                }
                pass.set_vertex_buffer(0, vertices.slice(u64::from(draw.vertex.offset)..));
                pass.set_index_buffer(indices.slice(..), draw.index.format.into());
                pass.draw_indexed(
                    draw.first_index..draw.first_index + draw.index_count,
                    draw.base_vertex,
                    0..1,
                );
            }
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_texture(&self.device, &self.config);
        }
    }
}
