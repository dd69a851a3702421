//! Render Pipelines
//!
//! Core render state holding all wgpu resources: the instanced wall
//! pipeline (five face orientations, one instance buffer each) and the
//! alpha-blended billboard pipeline fed per-draw through dynamic uniform
//! offsets. The draw list is the only per-frame input.

use std::num::NonZeroU64;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::entity::SpriteSheet;
use crate::render::draw_list::DrawList;
use crate::render::uniforms::{
    BILLBOARD_FACE, BillboardUniforms, EAST_FACE, FLOOR_FACE, FaceVertex, NORTH_FACE, QUAD_INDICES,
    SOUTH_FACE, TileInstance, WEST_FACE, WallUniforms,
};
use crate::render::walls::{FaceInstances, WallInstances};

/// Daytime sky.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.17,
    g: 0.66,
    b: 0.95,
    a: 1.0,
};

/// Dynamic-offset stride for billboard uniforms; must satisfy the device's
/// uniform offset alignment (256 on every backend we target).
const BILLBOARD_STRIDE: u64 = 256;

/// Uniform buffer capacity in billboards; the crowd plus props fits with
/// plenty of headroom.
const MAX_BILLBOARDS: usize = 1024;

/// A CPU-side RGBA sprite sheet to upload at startup.
pub struct SheetImage<'a> {
    pub rgba: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// One face orientation's static geometry plus its instances.
struct FaceDraw {
    vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

/// Core render state holding all wgpu resources.
pub struct RenderState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    quad_index_buffer: wgpu::Buffer,
    wall_pipeline: wgpu::RenderPipeline,
    wall_uniform_buffer: wgpu::Buffer,
    wall_bind_group: wgpu::BindGroup,
    faces: Vec<FaceDraw>,
    billboard_pipeline: wgpu::RenderPipeline,
    billboard_vertex_buffer: wgpu::Buffer,
    billboard_uniform_buffer: wgpu::Buffer,
    billboard_uniform_bind_group: wgpu::BindGroup,
    chars_bind_group: wgpu::BindGroup,
    props_bind_group: wgpu::BindGroup,
}

impl RenderState {
    /// Set up the GPU for a window: device, surface, both pipelines, the
    /// wall instance buffers and the three texture sheets.
    pub fn new(
        window: Arc<Window>,
        walls: &WallInstances,
        atlas: SheetImage,
        chars: SheetImage,
        props: SheetImage,
    ) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Tiletown Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        }))
        .expect("Failed to create GPU device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, config.width, config.height);

        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Pixel Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Wall pipeline: uniforms + atlas in one bind group.
        let wall_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Walls Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/walls.wgsl").into()),
        });

        let wall_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Wall Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(
                                std::mem::size_of::<WallUniforms>() as u64
                            ),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let wall_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Wall Uniform Buffer"),
            size: std::mem::size_of::<WallUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let atlas_view = create_sheet_texture(&device, &queue, "Wall Atlas", &atlas);
        let wall_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Wall Bind Group"),
            layout: &wall_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wall_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let wall_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Wall Pipeline Layout"),
                bind_group_layouts: &[&wall_bind_group_layout],
                push_constant_ranges: &[],
            });

        let wall_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Wall Pipeline"),
            layout: Some(&wall_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &wall_shader,
                entry_point: Some("vs_main"),
                buffers: &[FaceVertex::layout(), TileInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &wall_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let faces = [
            ("Floor", &FLOOR_FACE, &walls.floor),
            ("North", &NORTH_FACE, &walls.north),
            ("South", &SOUTH_FACE, &walls.south),
            ("West", &WEST_FACE, &walls.west),
            ("East", &EAST_FACE, &walls.east),
        ]
        .into_iter()
        .map(|(name, quad, instances)| create_face_draw(&device, name, quad, instances))
        .collect();

        // Billboard pipeline: dynamic-offset uniforms in group 0, the
        // sprite sheet in group 1 so sheets swap without rebinding uniforms.
        let billboard_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Billboard Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/billboard.wgsl").into()),
        });

        let billboard_uniform_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Billboard Uniform Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<BillboardUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let sheet_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Sheet Layout"),
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

        let billboard_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Billboard Uniform Buffer"),
            size: BILLBOARD_STRIDE * MAX_BILLBOARDS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let billboard_uniform_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Billboard Uniform Bind Group"),
                layout: &billboard_uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &billboard_uniform_buffer,
                        offset: 0,
                        size: NonZeroU64::new(std::mem::size_of::<BillboardUniforms>() as u64),
                    }),
                }],
            });

        let sheet_bind_group = |label: &str, sheet: &SheetImage| {
            let view = create_sheet_texture(&device, &queue, label, sheet);
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &sheet_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };
        let chars_bind_group = sheet_bind_group("Character Sheet", &chars);
        let props_bind_group = sheet_bind_group("Prop Sheet", &props);

        let billboard_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Billboard Pipeline Layout"),
                bind_group_layouts: &[&billboard_uniform_layout, &sheet_layout],
                push_constant_ranges: &[],
            });

        let billboard_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Billboard Pipeline"),
            layout: Some(&billboard_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &billboard_shader,
                entry_point: Some("vs_main"),
                buffers: &[FaceVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &billboard_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let billboard_vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Billboard Vertex Buffer"),
                contents: bytemuck::cast_slice(&BILLBOARD_FACE),
                usage: wgpu::BufferUsages::VERTEX,
            });

        tracing::info!(
            format = ?surface_format,
            wall_instances = walls.total(),
            "render state initialized"
        );

        Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            quad_index_buffer,
            wall_pipeline,
            wall_uniform_buffer,
            wall_bind_group,
            faces,
            billboard_pipeline,
            billboard_vertex_buffer,
            billboard_uniform_buffer,
            billboard_uniform_bind_group,
            chars_bind_group,
            props_bind_group,
        }
    }

    /// Handle window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, width, height);
    }

    /// Draw one frame from the prepared draw list.
    pub fn render(&mut self, draw_list: &DrawList) -> Result<(), wgpu::SurfaceError> {
        let wall_uniforms = WallUniforms {
            projection_view: draw_list.projection_view.to_cols_array_2d(),
            tint: [1.0, 1.0, 1.0, 1.0],
        };
        self.queue.write_buffer(
            &self.wall_uniform_buffer,
            0,
            bytemuck::bytes_of(&wall_uniforms),
        );

        let count = draw_list.billboards.len().min(MAX_BILLBOARDS);
        let mut staging = vec![0u8; count * BILLBOARD_STRIDE as usize];
        for (i, billboard) in draw_list.billboards.iter().take(count).enumerate() {
            let uniforms = BillboardUniforms {
                projection_view_model: billboard.projection_view_model.to_cols_array_2d(),
                uv_rect: billboard.uv.to_array(),
                tint: [billboard.tint.x, billboard.tint.y, billboard.tint.z, 1.0],
            };
            let start = i * BILLBOARD_STRIDE as usize;
            staging[start..start + std::mem::size_of::<BillboardUniforms>()]
                .copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        if count > 0 {
            self.queue
                .write_buffer(&self.billboard_uniform_buffer, 0, &staging);
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Town Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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
            });

            pass.set_pipeline(&self.wall_pipeline);
            pass.set_bind_group(0, &self.wall_bind_group, &[]);
            pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for face in &self.faces {
                if face.instance_count == 0 {
                    continue;
                }
                pass.set_vertex_buffer(0, face.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, face.instance_buffer.slice(..));
                pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..face.instance_count);
            }

            // Billboards draw farthest-first with blending; the draw list
            // is already sorted.
            pass.set_pipeline(&self.billboard_pipeline);
            pass.set_vertex_buffer(0, self.billboard_vertex_buffer.slice(..));
            for (i, billboard) in draw_list.billboards.iter().take(count).enumerate() {
                let offset = (i as u64 * BILLBOARD_STRIDE) as u32;
                pass.set_bind_group(0, &self.billboard_uniform_bind_group, &[offset]);
                let sheet = match billboard.sheet {
                    SpriteSheet::Characters => &self.chars_bind_group,
                    SpriteSheet::Props => &self.props_bind_group,
                };
                pass.set_bind_group(1, sheet, &[]);
                pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_sheet_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    sheet: &SheetImage,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: sheet.width,
        height: sheet.height,
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
        sheet.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * sheet.width),
            rows_per_image: Some(sheet.height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_face_draw(
    device: &wgpu::Device,
    name: &str,
    quad: &[FaceVertex; 4],
    instances: &FaceInstances,
) -> FaceDraw {
    let data: Vec<TileInstance> = instances
        .offsets
        .iter()
        .zip(&instances.tex_offsets)
        .map(|(&offset, &tex_offset)| TileInstance { offset, tex_offset })
        .collect();

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} Face Vertices")),
        contents: bytemuck::cast_slice(quad),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} Face Instances")),
        contents: bytemuck::cast_slice(&data),
        usage: wgpu::BufferUsages::VERTEX,
    });
    FaceDraw {
        vertex_buffer,
        instance_buffer,
        instance_count: data.len() as u32,
    }
}
