//! WGSL kernels and pipeline construction.
//!
//! Sources are templates over the scalar type: `SCALAR` is replaced by `f32`
//! or `f64` before compilation. Coefficients and scalars are passed in storage
//! buffers, so no floating-point literal of the scalar type appears in source.

use prk_core::{Precision, PrkError, Result};

/// Workgroup edge for the 2-D stencil dispatch.
pub(crate) const STENCIL_WORKGROUP: u32 = 16;

/// Workgroup width for the 1-D elementwise kernels.
pub(crate) const LINEAR_WORKGROUP: u32 = 256;

/// Maximum workgroups along one dispatch dimension.
pub(crate) const MAX_DISPATCH: u32 = 65_535;

const STENCIL_SHADER: &str = r#"
struct StencilParams {
    n: u32,
    radius: u32,
    taps: u32,
    _pad: u32,
}

@group(0) @binding(0) var<uniform> params: StencilParams;
@group(0) @binding(1) var<storage, read> offsets: array<vec2<i32>>;
@group(0) @binding(2) var<storage, read> weights: array<SCALAR>;
@group(0) @binding(3) var<storage, read> input: array<SCALAR>;
@group(0) @binding(4) var<storage, read_write> output: array<SCALAR>;

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.y;
    let j = gid.x;
    let r = params.radius;
    let n = params.n;

    // Active region only
    if (i < r || j < r || i >= n - r || j >= n - r) {
        return;
    }

    let idx = i * n + j;
    var acc = output[idx];
    for (var t = 0u; t < params.taps; t = t + 1u) {
        let o = offsets[t];
        let src = u32(i32(i) + o.x) * n + u32(i32(j) + o.y);
        acc = acc + weights[t] * input[src];
    }
    output[idx] = acc;
}
"#;

const ADD_SCALAR_SHADER: &str = r#"
struct LinearParams {
    len: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}

@group(0) @binding(0) var<uniform> params: LinearParams;
@group(0) @binding(1) var<storage, read> value: array<SCALAR>;
@group(0) @binding(2) var<storage, read_write> data: array<SCALAR>;

@compute @workgroup_size(256)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let idx = gid.y * groups.x * 256u + gid.x;
    if (idx >= params.len) {
        return;
    }
    data[idx] = data[idx] + value[0];
}
"#;

const TRIAD_SHADER: &str = r#"
struct LinearParams {
    len: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}

@group(0) @binding(0) var<uniform> params: LinearParams;
@group(0) @binding(1) var<storage, read> scalar: array<SCALAR>;
@group(0) @binding(2) var<storage, read_write> a: array<SCALAR>;
@group(0) @binding(3) var<storage, read> b: array<SCALAR>;
@group(0) @binding(4) var<storage, read> c: array<SCALAR>;

@compute @workgroup_size(256)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let idx = gid.y * groups.x * 256u + gid.x;
    if (idx >= params.len) {
        return;
    }
    a[idx] = a[idx] + b[idx] + scalar[0] * c[idx];
}
"#;

/// Uniform block of the stencil kernel.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct StencilParams {
    pub n: u32,
    pub radius: u32,
    pub taps: u32,
    pub _pad: u32,
}

/// Uniform block of the elementwise kernels.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LinearParams {
    pub len: u32,
    pub _pad: [u32; 3],
}

impl LinearParams {
    pub(crate) fn new(len: u32) -> Self {
        Self { len, _pad: [0; 3] }
    }
}

/// Kernels the backend knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ShaderKind {
    Stencil,
    AddScalar,
    Triad,
}

/// Binding slot type, in binding order.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Uniform,
    Read,
    ReadWrite,
}

impl ShaderKind {
    fn name(self) -> &'static str {
        match self {
            ShaderKind::Stencil => "stencil",
            ShaderKind::AddScalar => "add_scalar",
            ShaderKind::Triad => "triad",
        }
    }

    fn template(self) -> &'static str {
        match self {
            ShaderKind::Stencil => STENCIL_SHADER,
            ShaderKind::AddScalar => ADD_SCALAR_SHADER,
            ShaderKind::Triad => TRIAD_SHADER,
        }
    }

    fn slots(self) -> &'static [Slot] {
        match self {
            ShaderKind::Stencil => &[Slot::Uniform, Slot::Read, Slot::Read, Slot::Read, Slot::ReadWrite],
            ShaderKind::AddScalar => &[Slot::Uniform, Slot::Read, Slot::ReadWrite],
            ShaderKind::Triad => &[Slot::Uniform, Slot::Read, Slot::ReadWrite, Slot::Read, Slot::Read],
        }
    }

    /// WGSL source specialized to `precision`.
    pub(crate) fn source(self, precision: Precision) -> String {
        self.template().replace("SCALAR", precision.wgsl_type())
    }
}

/// Compiled compute pipeline and its bind group layout.
pub(crate) struct ComputePipeline {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl ComputePipeline {
    /// Compile `kind` for `precision`.
    ///
    /// Shader and pipeline validation errors are captured with an error scope
    /// and returned as `CompilationFailed`.
    pub(crate) fn new(device: &wgpu::Device, kind: ShaderKind, precision: Precision) -> Result<Self> {
        let label = format!("PRK {} ({})", kind.name(), precision);
        let source = kind.source(precision);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let entries: Vec<wgpu::BindGroupLayoutEntry> = kind
            .slots()
            .iter()
            .enumerate()
            .map(|(binding, slot)| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: match slot {
                        Slot::Uniform => wgpu::BufferBindingType::Uniform,
                        Slot::Read => wgpu::BufferBindingType::Storage { read_only: true },
                        Slot::ReadWrite => wgpu::BufferBindingType::Storage { read_only: false },
                    },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&label),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),
            module: &shader_module,
            entry_point: "main",
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(PrkError::CompilationFailed(format!("{}: {}", label, err)));
        }

        tracing::debug!("Compiled pipeline {}", label);

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }

    /// The wgpu pipeline.
    pub(crate) fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    /// Layout of bind group 0.
    pub(crate) fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

/// Workgroup counts covering `len` elements with the 1-D kernels.
///
/// Large lengths fold into a second dimension to stay under the per-dimension
/// dispatch limit. The shaders linearize with `num_workgroups`.
pub(crate) fn linear_dispatch(len: usize) -> (u32, u32) {
    let groups = len.div_ceil(LINEAR_WORKGROUP as usize).max(1);
    let x = groups.min(MAX_DISPATCH as usize);
    let y = groups.div_ceil(x);
    (x as u32, y as u32)
}

/// Workgroup counts covering an `n x n` grid with the stencil kernel.
pub(crate) fn grid_dispatch(n: usize) -> (u32, u32) {
    let groups = n.div_ceil(STENCIL_WORKGROUP as usize).max(1) as u32;
    (groups, groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_specialization() {
        let src = ShaderKind::Stencil.source(Precision::Double);
        assert!(src.contains("array<f64>"));
        assert!(!src.contains("SCALAR"));

        let src = ShaderKind::Triad.source(Precision::Single);
        assert!(src.contains("array<f32>"));
    }

    #[test]
    fn test_slots_match_bindings() {
        for kind in [ShaderKind::Stencil, ShaderKind::AddScalar, ShaderKind::Triad] {
            let src = kind.source(Precision::Single);
            let bindings = src.matches("@binding(").count();
            assert_eq!(bindings, kind.slots().len(), "{}", kind.name());
        }
    }

    #[test]
    fn test_linear_dispatch() {
        assert_eq!(linear_dispatch(1), (1, 1));
        assert_eq!(linear_dispatch(256), (1, 1));
        assert_eq!(linear_dispatch(257), (2, 1));

        let len = 100_000_000;
        let (x, y) = linear_dispatch(len);
        assert!(x <= MAX_DISPATCH);
        assert!(x as usize * y as usize * LINEAR_WORKGROUP as usize >= len);
    }

    #[test]
    fn test_grid_dispatch() {
        assert_eq!(grid_dispatch(16), (1, 1));
        assert_eq!(grid_dispatch(20), (2, 2));
    }

    #[test]
    fn test_params_layout() {
        assert_eq!(std::mem::size_of::<StencilParams>(), 16);
        assert_eq!(std::mem::size_of::<LinearParams>(), 16);
    }
}
