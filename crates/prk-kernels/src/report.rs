//! Banner lines printed ahead of the results.

use prk_core::DeviceInfo;

use crate::config::{RunConfig, TriadConfig};

/// Version line shared by both executables.
pub fn version_line() -> String {
    format!("Parallel Research Kernels version {}", env!("CARGO_PKG_VERSION"))
}

/// Header of the stencil executable.
pub fn stencil_banner(config: &RunConfig) -> String {
    let desc = config.descriptor();
    format!(
        "{}\nRust Stencil execution on 2D grid\n\
         Number of iterations = {}\n\
         Grid size            = {}\n\
         Tile size            = {}\n\
         Type of stencil      = {}\n\
         Radius of stencil    = {}\n",
        version_line(),
        config.iterations(),
        config.n(),
        config.tile_size(),
        desc.pattern,
        desc.radius
    )
}

/// Header of the triad executable.
pub fn triad_banner(config: &TriadConfig) -> String {
    format!(
        "{}\nRust STREAM triad: A = B + scalar * C\n\
         Number of iterations = {}\n\
         Vector length        = {}\n\
         Offset               = {}\n",
        version_line(),
        config.iterations(),
        config.length(),
        config.offset()
    )
}

/// Lines identifying a probed device.
pub fn device_banner(info: &DeviceInfo) -> String {
    format!("Device:   {}\nPlatform: {}\n", info.name, info.platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stencil::Pattern;
    use prk_core::{BackendKind, Capabilities};

    #[test]
    fn test_stencil_banner() {
        let config = RunConfig::new(10, 1000, 32, Pattern::Star, 2).unwrap();
        let banner = stencil_banner(&config);
        assert!(banner.contains("Grid size            = 1000\n"));
        assert!(banner.contains("Type of stencil      = star\n"));
        assert!(banner.contains("Radius of stencil    = 2\n"));
    }

    #[test]
    fn test_device_banner() {
        let info = DeviceInfo::new(BackendKind::Cpu, "Host CPU", "rayon", Capabilities::new());
        assert_eq!(device_banner(&info), "Device:   Host CPU\nPlatform: rayon\n");
    }
}
