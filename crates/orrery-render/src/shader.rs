//! Shader program compilation, interface checking, and caching.
//!
//! A program is one WGSL module holding a vertex and a fragment entry point.
//! Compiling runs the source through naga's parser and validator so broken
//! sources surface as [`ShaderError::CompileFailed`] instead of a device
//! validation panic. Linking checks the two entry points against each other.

use log::{debug, info};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

/// Error types for shader program operations.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' failed to compile: {message}")]
    CompileFailed { name: String, message: String },

    #[error("shader '{name}' failed to link: {message}")]
    LinkFailed { name: String, message: String },

    #[error("shader '{name}' not found in library")]
    NotLoaded { name: String },
}

/// Entry point names of a vertex + fragment program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoints {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

impl Default for EntryPoints {
    fn default() -> Self {
        Self {
            vertex: "vs_main",
            fragment: "fs_main",
        }
    }
}

/// Stage interface of a program that passed compile and link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInterface {
    /// `@location`s read by the vertex entry point (vertex attributes).
    pub vertex_inputs: BTreeSet<u32>,
    /// `@location`s passed from the vertex to the fragment stage.
    pub varyings: BTreeSet<u32>,
}

/// A compiled, linked program ready for pipeline creation.
#[derive(Debug)]
pub struct ShaderProgram {
    pub module: wgpu::ShaderModule,
    pub entry_points: EntryPoints,
    pub interface: ProgramInterface,
}

/// Compiles and links a program without a device.
pub fn validate_program(
    name: &str,
    source: &str,
    entry_points: EntryPoints,
) -> Result<ProgramInterface, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| ShaderError::CompileFailed {
        name: name.to_string(),
        message: err.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|err| ShaderError::CompileFailed {
        name: name.to_string(),
        message: err.as_inner().to_string(),
    })?;

    link(name, &module, entry_points)
}

fn link(
    name: &str,
    module: &naga::Module,
    entry_points: EntryPoints,
) -> Result<ProgramInterface, ShaderError> {
    let link_error = |message: String| ShaderError::LinkFailed {
        name: name.to_string(),
        message,
    };

    let vertex = find_entry_point(module, entry_points.vertex, naga::ShaderStage::Vertex)
        .map_err(link_error)?;
    let fragment = find_entry_point(module, entry_points.fragment, naga::ShaderStage::Fragment)
        .map_err(link_error)?;

    let mut vertex_inputs = BTreeSet::new();
    for arg in &vertex.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut vertex_inputs);
    }

    let mut varyings = BTreeSet::new();
    if let Some(result) = &vertex.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut varyings);
    }

    let mut fragment_inputs = BTreeSet::new();
    for arg in &fragment.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut fragment_inputs);
    }

    let unmatched: Vec<String> = fragment_inputs
        .difference(&varyings)
        .map(u32::to_string)
        .collect();
    if !unmatched.is_empty() {
        return Err(link_error(format!(
            "fragment input location(s) {} not written by vertex stage '{}'",
            unmatched.join(", "),
            entry_points.vertex
        )));
    }

    Ok(ProgramInterface {
        vertex_inputs,
        varyings,
    })
}

fn find_entry_point<'m>(
    module: &'m naga::Module,
    name: &str,
    stage: naga::ShaderStage,
) -> Result<&'m naga::EntryPoint, String> {
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.name == name)
        .ok_or_else(|| format!("missing entry point '{name}'"))?;
    if entry.stage != stage {
        return Err(format!(
            "entry point '{name}' is a {:?} shader, expected {stage:?}",
            entry.stage
        ));
    }
    Ok(entry)
}

/// Gathers user-defined `@location`s from a binding or the members of a struct type.
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Central registry of compiled shader programs, keyed by name.
pub struct ShaderLibrary {
    programs: HashMap<String, Arc<ShaderProgram>>,
}

impl ShaderLibrary {
    /// Create a new empty shader library.
    pub fn new() -> Self {
        Self {
            programs: HashMap::new(),
        }
    }

    /// Compile and link a program from WGSL source, replacing any program of the same name.
    pub fn compile(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
        entry_points: EntryPoints,
    ) -> Result<Arc<ShaderProgram>, ShaderError> {
        debug!("Compiling shader '{}'", name);

        let interface = validate_program(name, source, entry_points)?;
        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });

        let program = Arc::new(ShaderProgram {
            module,
            entry_points,
            interface,
        });
        let replaced = self
            .programs
            .insert(name.to_string(), program.clone())
            .is_some();

        if replaced {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }

        Ok(program)
    }

    /// Get a previously compiled program by name.
    pub fn get(&self, name: &str) -> Option<Arc<ShaderProgram>> {
        self.programs.get(name).cloned()
    }

    /// Like [`get`](Self::get) but reports a missing program as an error.
    pub fn require(&self, name: &str) -> Result<Arc<ShaderProgram>, ShaderError> {
        self.get(name).ok_or_else(|| ShaderError::NotLoaded {
            name: name.to_string(),
        })
    }

    /// Number of loaded programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Check if the shader library is empty.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::test_device;

    const VALID_SHADER: &str = r#"
        struct VsOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
            var out: VsOut;
            out.clip = vec4<f32>(position, 1.0);
            out.uv = uv;
            return out;
        }

        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return vec4<f32>(uv, 0.0, 1.0);
        }
    "#;

    const UNDECLARED_IDENT: &str = r#"
        @vertex
        fn vs_main() -> @builtin(position) vec4<f32> {
            return undeclared_variable;
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0);
        }
    "#;

    const SYNTAX_ERROR: &str = "@vertex fn vs_main( -> {";

    const MISMATCHED_VARYING: &str = r#"
        struct VsOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
            var out: VsOut;
            out.clip = vec4<f32>(position, 1.0);
            out.uv = position.xy;
            return out;
        }

        @fragment
        fn fs_main(@location(1) normal: vec3<f32>) -> @location(0) vec4<f32> {
            return vec4<f32>(normal, 1.0);
        }
    "#;

    const VERTEX_ONLY: &str = r#"
        @vertex
        fn vs_main() -> @builtin(position) vec4<f32> {
            return vec4<f32>(0.0, 0.0, 0.0, 1.0);
        }
    "#;

    #[test]
    fn test_valid_program_reports_interface() {
        let interface = validate_program("quad", VALID_SHADER, EntryPoints::default()).unwrap();
        assert_eq!(interface.vertex_inputs, BTreeSet::from([0, 1]));
        assert_eq!(interface.varyings, BTreeSet::from([0]));
    }

    #[test]
    fn test_syntax_error_is_compile_failure() {
        let err = validate_program("broken", SYNTAX_ERROR, EntryPoints::default()).unwrap_err();
        match err {
            ShaderError::CompileFailed { name, .. } => assert_eq!(name, "broken"),
            other => panic!("expected CompileFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_identifier_is_compile_failure() {
        let err =
            validate_program("undeclared", UNDECLARED_IDENT, EntryPoints::default()).unwrap_err();
        match err {
            ShaderError::CompileFailed { message, .. } => {
                assert!(
                    message.contains("undeclared_variable"),
                    "message: {message}"
                )
            }
            other => panic!("expected CompileFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_unmatched_fragment_input_is_link_failure() {
        let err =
            validate_program("mismatch", MISMATCHED_VARYING, EntryPoints::default()).unwrap_err();
        match err {
            ShaderError::LinkFailed { message, .. } => {
                assert!(message.contains('1'), "message: {message}")
            }
            other => panic!("expected LinkFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fragment_entry_is_link_failure() {
        let err = validate_program("vs_only", VERTEX_ONLY, EntryPoints::default()).unwrap_err();
        assert!(matches!(err, ShaderError::LinkFailed { .. }));
    }

    #[test]
    fn test_entry_point_with_wrong_stage_is_link_failure() {
        let swapped = EntryPoints {
            vertex: "fs_main",
            fragment: "vs_main",
        };
        let err = validate_program("swapped", VALID_SHADER, swapped).unwrap_err();
        match err {
            ShaderError::LinkFailed { message, .. } => {
                assert!(message.contains("expected Vertex"), "message: {message}")
            }
            other => panic!("expected LinkFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_shader_library_starts_empty() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert_eq!(library.len(), 0);
    }

    #[test]
    fn test_require_missing_program_is_not_loaded() {
        let library = ShaderLibrary::new();
        assert!(library.get("nonexistent").is_none());
        assert!(matches!(
            library.require("nonexistent"),
            Err(ShaderError::NotLoaded { .. })
        ));
    }

    #[test]
    fn test_compile_caches_by_name() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library
            .compile(&device, "shared", VALID_SHADER, EntryPoints::default())
            .unwrap();

        let a = library.get("shared").unwrap();
        let b = library.get("shared").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_compile_failure_leaves_library_untouched() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let result = library.compile(&device, "bad", UNDECLARED_IDENT, EntryPoints::default());
        assert!(matches!(result, Err(ShaderError::CompileFailed { .. })));
        assert!(library.is_empty());
    }

    #[test]
    fn test_recompile_replaces_cached_program() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library
            .compile(&device, "reloadable", VALID_SHADER, EntryPoints::default())
            .unwrap();
        let original = library.get("reloadable").unwrap();

        library
            .compile(&device, "reloadable", VALID_SHADER, EntryPoints::default())
            .unwrap();
        let reloaded = library.get("reloadable").unwrap();

        assert_eq!(library.len(), 1);
        assert!(!Arc::ptr_eq(&original, &reloaded));
    }
}
