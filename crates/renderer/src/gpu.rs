//! GPU-side vertex/uniform layouts and resource uploads.

use asset::{FilterMode, MeshData, MeshVertex, TextureData};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Extent3d, Queue, TextureDescriptor,
    TextureDimension, TextureUsages, VertexBufferLayout, VertexStepMode, util::DeviceExt,
};

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

impl From<&MeshVertex> for Vertex {
    fn from(v: &MeshVertex) -> Self {
        Self {
            pos: v.position,
            normal: v.normal,
            uv: v.uv,
        }
    }
}

/// Shadow volume vertex: position only.
pub const VOLUME_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Per-pass uniforms (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub sun_dir: [f32; 4],
    pub sun_color: [f32; 4],
    pub ambient: [f32; 4],
}

impl Globals {
    pub fn new(view_proj: Mat4, sun_dir: Vec3, sun_color: Vec3, ambient: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            sun_dir: sun_dir.extend(0.0).to_array(),
            sun_color: sun_color.extend(0.0).to_array(),
            ambient: ambient.extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialUniform {
    pub tint: [f32; 4],
}

/// Indexed mesh uploaded to the GPU.
pub struct GpuMesh {
    pub vertex_buf: Buffer,
    pub index_buf: Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, label: &str, mesh: &MeshData) -> Self {
        let vertices: Vec<Vertex> = mesh.vertices.iter().map(Vertex::from).collect();
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });
        Self {
            vertex_buf,
            index_buf,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// Non-indexed triangle list of an extruded shadow volume.
pub struct GpuVolume {
    pub vertex_buf: Buffer,
    pub vertex_count: u32,
}

impl GpuVolume {
    pub fn upload(device: &Device, label: &str, triangles: &[[f32; 3]]) -> Self {
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} shadow VB")),
            contents: bytemuck::cast_slice(triangles),
            usage: BufferUsages::VERTEX,
        });
        Self {
            vertex_buf,
            vertex_count: triangles.len() as u32,
        }
    }
}

pub fn uniform_buffer<T: Pod>(device: &Device, label: &str, value: &T) -> Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: BufferUsages::UNIFORM,
    })
}

pub fn globals_bind_group(
    device: &Device,
    layout: &BindGroupLayout,
    label: &str,
    globals: &Globals,
) -> BindGroup {
    let buf = uniform_buffer(device, label, globals);
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buf.as_entire_binding(),
        }],
    })
}

/// Upload an RGBA8 texture (sRGB) and bind it with its tint and sampler.
pub fn material_bind_group(
    device: &Device,
    queue: &Queue,
    layout: &BindGroupLayout,
    label: &str,
    texture: &TextureData,
    tint: [f32; 4],
) -> BindGroup {
    let size = Extent3d {
        width: texture.width,
        height: texture.height,
        depth_or_array_layers: 1,
    };
    let gpu_tex = device.create_texture(&TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &gpu_tex,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &texture.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(texture.width * texture.bytes_per_pixel()),
            rows_per_image: Some(texture.height),
        },
        size,
    );
    let view = gpu_tex.create_view(&wgpu::TextureViewDescriptor::default());

    let filter = filter_mode(texture.filter);
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    });

    let material = uniform_buffer(device, label, &MaterialUniform { tint });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: material.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    })
}

pub fn filter_mode(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}
