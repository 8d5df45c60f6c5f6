//! Render pipelines for the three shadow-volume passes.

use std::num::NonZeroU64;

use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState,
    BufferBindingType, ColorTargetState, ColorWrites, CompareFunction, DepthBiasState,
    DepthStencilState, Device, FragmentState, PipelineLayoutDescriptor, RenderPipeline,
    RenderPipelineDescriptor, SamplerBindingType, ShaderModule, ShaderModuleDescriptor,
    ShaderSource, ShaderStages, StencilFaceState, StencilOperation, StencilState, TextureFormat,
    TextureSampleType, TextureViewDimension, VertexBufferLayout, VertexState,
};

use crate::gpu::{Globals, MaterialUniform, VOLUME_LAYOUT, Vertex};

pub const COLOR_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth24PlusStencil8;

pub struct Pipelines {
    pub globals_bgl: BindGroupLayout,
    pub material_bgl: BindGroupLayout,
    /// Ambient-only surfaces; fills depth.
    pub ambient: RenderPipeline,
    /// Shadow volumes; depth-fail stencil counting, no color.
    pub volume: RenderPipeline,
    /// Fully lit surfaces where the stencil count is zero.
    pub lit: RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &Device) -> Self {
        let lit_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Lit WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/lit.wgsl").into()),
        });
        let volume_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Shadow volume WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/volume.wgsl").into()),
        });

        let globals_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Globals BGL"),
            entries: &[uniform_entry(
                0,
                ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                std::mem::size_of::<Globals>(),
            )],
        });
        let material_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Material BGL"),
            entries: &[
                uniform_entry(
                    0,
                    ShaderStages::FRAGMENT,
                    std::mem::size_of::<MaterialUniform>(),
                ),
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let surface_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Surface PipelineLayout"),
            bind_group_layouts: &[&globals_bgl, &material_bgl],
            push_constant_ranges: &[],
        });
        let volume_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Volume PipelineLayout"),
            bind_group_layouts: &[&globals_bgl],
            push_constant_ranges: &[],
        });

        let ambient = create_pipeline(
            device,
            PassConfig {
                label: "Ambient Pipeline",
                layout: &surface_layout,
                shader: &lit_shader,
                buffers: &[Vertex::LAYOUT],
                cull_mode: Some(wgpu::Face::Back),
                color_writes: ColorWrites::ALL,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
            },
        );

        let volume = create_pipeline(
            device,
            PassConfig {
                label: "Shadow Volume Pipeline",
                layout: &volume_layout,
                shader: &volume_shader,
                buffers: &[VOLUME_LAYOUT],
                cull_mode: None,
                color_writes: ColorWrites::empty(),
                depth_write_enabled: false,
                depth_compare: CompareFunction::Less,
                stencil: StencilState {
                    front: depth_fail(StencilOperation::DecrementWrap),
                    back: depth_fail(StencilOperation::IncrementWrap),
                    read_mask: 0xff,
                    write_mask: 0xff,
                },
            },
        );

        let unshadowed = StencilFaceState {
            compare: CompareFunction::Equal,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        };
        let lit = create_pipeline(
            device,
            PassConfig {
                label: "Lit Pipeline",
                layout: &surface_layout,
                shader: &lit_shader,
                buffers: &[Vertex::LAYOUT],
                cull_mode: Some(wgpu::Face::Back),
                color_writes: ColorWrites::ALL,
                depth_write_enabled: false,
                depth_compare: CompareFunction::LessEqual,
                stencil: StencilState {
                    front: unshadowed,
                    back: unshadowed,
                    read_mask: 0xff,
                    write_mask: 0,
                },
            },
        );

        Self {
            globals_bgl,
            material_bgl,
            ambient,
            volume,
            lit,
        }
    }
}

struct PassConfig<'a> {
    label: &'static str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a ShaderModule,
    buffers: &'a [VertexBufferLayout<'static>],
    cull_mode: Option<wgpu::Face>,
    color_writes: ColorWrites,
    depth_write_enabled: bool,
    depth_compare: CompareFunction,
    stencil: StencilState,
}

fn create_pipeline(device: &Device, cfg: PassConfig<'_>) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(cfg.label),
        layout: Some(cfg.layout),
        vertex: VertexState {
            module: cfg.shader,
            entry_point: Some("vs_main"),
            buffers: cfg.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: cfg.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: COLOR_FORMAT,
                blend: Some(BlendState::REPLACE),
                write_mask: cfg.color_writes,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: cfg.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: cfg.depth_write_enabled,
            depth_compare: cfg.depth_compare,
            stencil: cfg.stencil,
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn uniform_entry(binding: u32, visibility: ShaderStages, size: usize) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

/// Two-sided depth-fail counting: only the depth-fail op touches the stencil.
fn depth_fail(op: StencilOperation) -> StencilFaceState {
    StencilFaceState {
        compare: CompareFunction::Always,
        fail_op: StencilOperation::Keep,
        depth_fail_op: op,
        pass_op: StencilOperation::Keep,
    }
}
