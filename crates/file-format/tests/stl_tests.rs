use file_format::*;
use mesh_extract::TriangleBuffer;
use part_catalog::{SelectionState, Variant};
use part_engine::{run_pipeline_on, Bushing, JawCouplingHalf, PipelineConfig};
use proptest::prelude::*;
use shape_kernel::ReferenceKernel;

fn part_mesh() -> TriangleBuffer {
    run_pipeline_on::<ReferenceKernel>(
        &JawCouplingHalf::default(),
        &SelectionState::configured(0, Variant::First),
        &PipelineConfig::coarse(),
    )
    .unwrap()
    .mesh
}

#[test]
fn part_mesh_survives_ascii() {
    let mesh = part_mesh();
    let text = export_ascii_stl(&mesh, "jaw");
    assert_eq!(text.matches("endfacet").count(), mesh.triangle_count());
    let doc = import_ascii_stl(&text).unwrap();
    assert_eq!(doc.name, "jaw");
    assert_eq!(doc.mesh, mesh);
}

#[test]
fn part_mesh_survives_binary() {
    let mesh = part_mesh();
    let doc = import_binary_stl(&export_binary_stl(&mesh, "jaw").unwrap()).unwrap();
    assert_eq!(doc.mesh, mesh);
}

#[test]
fn files_round_trip_in_both_formats() {
    let mesh = run_pipeline_on::<ReferenceKernel>(
        &Bushing::default(),
        &SelectionState::configured(2, Variant::Second),
        &PipelineConfig::coarse(),
    )
    .unwrap()
    .mesh;
    let dir = std::env::temp_dir();
    for (format, file) in [(StlFormat::Ascii, "bushing-ascii.stl"), (StlFormat::Binary, "bushing-binary.stl")] {
        let path = dir.join(format!("{}-{file}", std::process::id()));
        save_stl(&path, &mesh, "bushing", format).unwrap();
        let doc = load_stl(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(doc.name, "bushing", "{format:?}");
        assert_eq!(doc.mesh, mesh, "{format:?}");
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("no-such-dir-for-stl").join("x.stl");
    assert!(matches!(load_stl(&path), Err(StlError::Io { .. })));
}

#[test]
fn empty_solid() {
    let text = export_ascii_stl(&TriangleBuffer::new(), "empty");
    assert_eq!(text, "solid empty\nendsolid empty\n");
    assert!(import_ascii_stl(&text).unwrap().mesh.is_empty());
}

#[test]
fn stray_keyword_is_reported_with_its_line() {
    let text = "solid a\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertx 1 0 0\n";
    assert_eq!(
        import_ascii_stl(text),
        Err(StlError::UnexpectedToken {
            line: 5,
            token: "vertx".into()
        })
    );
}

fn corner() -> impl Strategy<Value = [f32; 3]> {
    prop::array::uniform3(-1.0e6f32..1.0e6)
}

proptest! {
    #[test]
    fn ascii_text_is_exact(
        facets in prop::collection::vec((corner(), corner(), corner(), corner()), 1..20)
    ) {
        let mut mesh = TriangleBuffer::new();
        for (a, b, c, n) in facets {
            mesh.push_flat([a, b, c], n);
        }
        let doc = import_ascii_stl(&export_ascii_stl(&mesh, "p")).unwrap();
        prop_assert_eq!(doc.mesh, mesh);
    }
}
