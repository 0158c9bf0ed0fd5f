use std::fs;
use std::path::Path;

const SHADER_PATH: &str = "src/shaders/points.wgsl";

fn shader_source() -> String {
    fs::read_to_string(Path::new(SHADER_PATH)).expect("Failed to read shader file")
}

#[test]
fn test_shader_file_exists() {
    let shader_path = Path::new(SHADER_PATH);
    assert!(shader_path.exists(), "Shader file should exist at {:?}", shader_path);
}

#[test]
fn test_shader_entry_points() {
    let shader_content = shader_source();

    assert!(shader_content.contains("@vertex"), "Shader should contain vertex entry point");
    assert!(shader_content.contains("@fragment"), "Shader should contain fragment entry point");
    assert!(shader_content.contains("fn vs_main"), "Shader should have vs_main function");
    assert!(shader_content.contains("fn fs_main"), "Shader should have fs_main function");
}

#[test]
fn test_shader_bindings_match_renderer() {
    let shader_content = shader_source();

    assert!(shader_content.contains("struct PointUniform"), "Shader should define PointUniform");
    assert!(shader_content.contains("@group(0) @binding(0)"), "Shader should have binding 0");
    assert!(!shader_content.contains("@binding(1)"), "Renderer only binds slot 0");

    assert!(shader_content.contains("@location(0) position"), "Shader should have position attribute");
    assert!(shader_content.contains("@location(1) color"), "Shader should have color attribute");
    assert!(shader_content.contains("@builtin(vertex_index)"), "Quads are expanded from vertex_index");
}

#[test]
fn test_uniform_field_order() {
    let shader_content = shader_source();
    let order = ["view_proj:", "model:", "viewport:", "size:", "size_attenuation:"];

    let positions: Vec<usize> = order
        .iter()
        .map(|field| shader_content.find(field).unwrap_or_else(|| panic!("missing {}", field)))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "Uniform fields out of order");
}

#[test]
fn test_shader_color_passthrough() {
    let shader_content = shader_source();

    assert!(shader_content.contains("output.color = input.color"), "Vertex shader should pass through color");
    assert!(shader_content.contains("return vec4<f32>(input.color, 1.0)"), "Fragment shader should output color with alpha");
}
