//! Renderer: headless wgpu + stencil shadow volumes.
//! Draws a composed [`Scene`] once and reads the frame back as an image.
//! wgpu = 26.x

mod gpu;
mod pipeline;
mod readback;

use anyhow::{Context, Result};
use asset::TextureData;
use glam::Vec3;
use image::RgbaImage;
use scene::{Material, Scene};
use wgpu::{
    BindGroup, CommandEncoderDescriptor, Device, DeviceDescriptor, Extent3d, Instance,
    InstanceDescriptor, LoadOp, Operations, PowerPreference, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureDescriptor, TextureDimension, TextureUsages,
    TextureView, TextureViewDescriptor,
};

use crate::gpu::{GpuMesh, GpuVolume, Globals};
use crate::pipeline::{COLOR_FORMAT, DEPTH_FORMAT, Pipelines};
use crate::readback::Readback;

/// How far shadow volumes are pushed along the sun direction.
const SHADOW_EXTRUSION: f32 = 50.0;

pub struct Renderer {
    device: Device,
    queue: Queue,
    pipelines: Pipelines,
    white: TextureData,
}

/// Everything one entity needs during the render pass.
struct DrawItem {
    mesh: GpuMesh,
    material: BindGroup,
    volume: Option<GpuVolume>,
}

impl Renderer {
    /// Create a headless device on one of `backends`. Blocks until ready.
    pub fn new(backends: wgpu::Backends) -> Result<Self> {
        pollster::block_on(Self::new_async(backends))
    }

    async fn new_async(backends: wgpu::Backends) -> Result<Self> {
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Podview Device"),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .context("request_device failed")?;

        let pipelines = Pipelines::new(&device);

        Ok(Self {
            device,
            queue,
            pipelines,
            white: TextureData::white(),
        })
    }

    /// Render one frame of `scene`: ambient pass, shadow volumes into the
    /// stencil buffer, then the sun-lit pass where nothing is in shadow.
    pub fn render(&self, scene: &Scene<'_>) -> Result<RgbaImage> {
        let (width, height) = (scene.width.max(1), scene.height.max(1));
        let view_proj = scene.camera.proj_view();

        let ambient_globals = gpu::globals_bind_group(
            &self.device,
            &self.pipelines.globals_bgl,
            "Ambient globals",
            &Globals::new(view_proj, scene.sun.direction, Vec3::ZERO, scene.ambient),
        );
        let lit_globals = gpu::globals_bind_group(
            &self.device,
            &self.pipelines.globals_bgl,
            "Lit globals",
            &Globals::new(view_proj, scene.sun.direction, scene.sun.color, scene.ambient),
        );

        let items: Vec<DrawItem> = scene
            .entities
            .iter()
            .filter(|entity| entity.mesh.is_valid())
            .map(|entity| {
                let (texture, tint) = match entity.material {
                    Material::Textured(texture) => (texture, [1.0; 4]),
                    Material::Matte([r, g, b]) => (&self.white, [r, g, b, 1.0]),
                };
                let volume = entity
                    .shadow
                    .filter(|volume| scene.sun.casts_shadows && !volume.is_empty())
                    .map(|volume| volume.extrude(scene.sun.direction, SHADOW_EXTRUSION))
                    .filter(|triangles| !triangles.is_empty())
                    .map(|triangles| GpuVolume::upload(&self.device, entity.label, &triangles));
                DrawItem {
                    mesh: GpuMesh::upload(&self.device, entity.label, &entity.mesh),
                    material: gpu::material_bind_group(
                        &self.device,
                        &self.queue,
                        &self.pipelines.material_bgl,
                        entity.label,
                        texture,
                        tint,
                    ),
                    volume,
                }
            })
            .collect();
        log::debug!("Drawing {} entities", items.len());

        let color = self.device.create_texture(&TextureDescriptor {
            label: Some("ColorTex"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&TextureViewDescriptor::default());
        let depth_view = create_depth_view(&self.device, width, height);

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let [r, g, b, a] = scene.background;
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &color_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: Some(Operations {
                        load: LoadOp::Clear(0),
                        store: StoreOp::Store,
                    }),
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipelines.ambient);
            rpass.set_bind_group(0, &ambient_globals, &[]);
            for item in &items {
                draw_surface(&mut rpass, item);
            }

            rpass.set_pipeline(&self.pipelines.volume);
            rpass.set_bind_group(0, &lit_globals, &[]);
            for volume in items.iter().filter_map(|item| item.volume.as_ref()) {
                rpass.set_vertex_buffer(0, volume.vertex_buf.slice(..));
                rpass.draw(0..volume.vertex_count, 0..1);
            }

            rpass.set_pipeline(&self.pipelines.lit);
            rpass.set_bind_group(0, &lit_globals, &[]);
            rpass.set_stencil_reference(0);
            for item in &items {
                draw_surface(&mut rpass, item);
            }
        }

        let readback = Readback::new(&self.device, width, height);
        readback.encode_copy(&mut encoder, &color);
        self.queue.submit(Some(encoder.finish()));

        let image = readback.finish(&self.device)?;
        log::info!("Rendered {}x{} frame", image.width(), image.height());
        Ok(image)
    }
}

fn draw_surface(rpass: &mut wgpu::RenderPass<'_>, item: &DrawItem) {
    rpass.set_bind_group(1, &item.material, &[]);
    rpass.set_vertex_buffer(0, item.mesh.vertex_buf.slice(..));
    rpass.set_index_buffer(item.mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
    rpass.draw_indexed(0..item.mesh.index_count, 0, 0..1);
}

/// Create a depth/stencil view of the given size.
fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthStencilTex"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
