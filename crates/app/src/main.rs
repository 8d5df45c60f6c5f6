//! Entry point for podview.
//! Logging + CLI flags: --assets, --out, --gpu-backend.

use std::path::PathBuf;

use anyhow::Result;
use platform::ViewerConfig;

const DEFAULT_ASSETS: &str = "http://127.0.0.1:8000/";
const DEFAULT_OUT: &str = "pod.png";

fn parse_backend_arg() -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all();
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    log::warn!("Unknown backend '{}', falling back to auto.", other);
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

/// Last `--<name>=value` wins; empty values are ignored.
fn parse_value_arg(name: &str) -> Option<String> {
    let prefix = format!("--{name}=");
    std::env::args()
        .filter_map(|arg| arg.strip_prefix(&prefix).map(str::to_owned))
        .filter(|val| !val.is_empty())
        .last()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig {
        assets: parse_value_arg("assets").unwrap_or_else(|| DEFAULT_ASSETS.to_owned()),
        output: PathBuf::from(parse_value_arg("out").unwrap_or_else(|| DEFAULT_OUT.to_owned())),
        backends: parse_backend_arg(),
    };
    log::info!(
        "Starting podview. Assets: {}, output: {}, backend: {:?}",
        config.assets,
        config.output.display(),
        config.backends
    );

    platform::run_viewer(config)?;

    log::info!("Done.");
    Ok(())
}
