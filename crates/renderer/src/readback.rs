//! Copy the color target back to the CPU.

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use wgpu::{Buffer, BufferDescriptor, BufferUsages, CommandEncoder, Device, Extent3d, Texture};

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch wgpu requires for texture-to-buffer copies.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drop the per-row padding of a mapped readback buffer.
pub fn unpad_rows(padded: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row = (width * BYTES_PER_PIXEL) as usize;
    let pitch = padded_bytes_per_row(width) as usize;
    padded
        .chunks(pitch)
        .take(height as usize)
        .flat_map(|chunk| &chunk[..row])
        .copied()
        .collect()
}

/// Staging buffer sized for `width` x `height` RGBA8 with row padding.
pub struct Readback {
    buffer: Buffer,
    width: u32,
    height: u32,
}

impl Readback {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Readback"),
            size: u64::from(padded_bytes_per_row(width)) * u64::from(height),
            usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn encode_copy(&self, encoder: &mut CommandEncoder, texture: &Texture) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row(self.width)),
                    rows_per_image: Some(self.height),
                },
            },
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Map the buffer after the copy has been submitted and wait for it.
    pub fn finish(self, device: &Device) -> Result<RgbaImage> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| anyhow!("Device poll failed: {e:?}"))?;
        rx.recv()
            .context("Readback callback dropped")?
            .map_err(|e| anyhow!("Buffer map failed: {e:?}"))?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, self.width, self.height)
        };
        self.buffer.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| anyhow!("Readback size mismatch"))
    }
}
