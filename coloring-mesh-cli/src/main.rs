mod cli;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Action, CliArgs, Format};
use coloring_mesh_core::prelude::*;
use coloring_mesh_image::{
    color_buffer_from_image, generate_mask_from_image, generate_mask_image,
    image_from_color_buffer,
};
use image::GenericImageView;
use obj_exporter::{Geometry, ObjSet, Object, Primitive, Shape, TVertex, Vertex};
use settings::{load, SessionSettings};
use std::{fs::write, path::Path, sync::Once};

fn main() -> Result<()> {
    run_app(CliArgs::parse())
}

static LOGGING: Once = Once::new();

fn init_logging(verbose: bool) {
    LOGGING.call_once(|| {
        let mut builder = env_logger::Builder::new();
        if verbose {
            builder.filter_level(log::LevelFilter::Debug);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }
        // test harness may have installed a logger already
        let _ = builder.try_init();
    });
}

fn run_app(args: CliArgs) -> Result<()> {
    match args.action {
        Action::Mask { common } => {
            init_logging(common.verbose);
            let settings = SessionSettings::resolve(&common, None)?;
            log::debug!("{:#?}", settings.mask);
            let image = open_image(&common.input)?;
            let mask = generate_mask_image(&image, &settings.mask)
                .context("Cannot produce foreground mask image")?;
            mask.save(&common.output)
                .with_context(|| format!("Cannot save output image {}", common.output.display()))?;
        }
        Action::Mesh {
            common,
            density,
            format,
        } => {
            init_logging(common.verbose);
            let settings = SessionSettings::resolve(&common, Some(&density))?;
            log::debug!("{:#?}", settings);
            let image = open_image(&common.input)?;
            let mask = generate_mask_from_image(&image, &settings.mask)
                .context("Cannot produce foreground mask")?;
            let mesh = ColoringMeshGenerator::new(
                mask,
                settings.density,
                settings.controller.mesh.clone(),
            )
            .process_wait_tracked(|current, limit, percentage| {
                log::debug!(
                    "Progress: {}% ({} / {})",
                    (percentage * 100.0).max(0.0).min(100.0),
                    current,
                    limit
                );
            })
            .context("Cannot produce coloring mesh")?;
            log::info!(
                "Mesh with {} vertices ({} on boundary) and {} triangles",
                mesh.vertices.len(),
                mesh.boundary_vertices_count(),
                mesh.triangles.len()
            );
            save_mesh(&mesh, &image, &format, &settings, &common.output)?;
        }
        Action::Paint {
            common,
            density,
            events,
        } => {
            init_logging(common.verbose);
            let settings = SessionSettings::resolve(&common, Some(&density))?;
            log::debug!("{:#?}", settings);
            let events: Vec<Event> = load(&events)?;
            let image = open_image(&common.input)?;
            let mask = generate_mask_from_image(&image, &settings.mask)
                .context("Cannot produce foreground mask")?;
            let base = color_buffer_from_image(&image)?;
            let mut controller =
                MeshController::new(base, mask, settings.density, settings.controller)
                    .context("Cannot produce coloring mesh")?;
            for (index, event) in events.into_iter().enumerate() {
                let outcome = controller.handle(event);
                log::debug!("Event #{}: {:?}", index, outcome);
                match outcome {
                    EventOutcome::SaveRequested => save_render(&controller, &common.output)?,
                    EventOutcome::QuitRequested => break,
                    _ => {}
                }
            }
            log::info!(
                "{} of {} triangles painted",
                controller.paint_state().len(),
                controller.mesh().triangles.len()
            );
            save_render(&controller, &common.output)?;
        }
    }
    Ok(())
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).with_context(|| format!("Cannot open input image {}", path.display()))
}

fn save_render(controller: &MeshController, output: &Path) -> Result<()> {
    image_from_color_buffer(&controller.render())?
        .save(output)
        .with_context(|| format!("Cannot save output image {}", output.display()))
}

fn save_mesh(
    mesh: &ColoringMesh,
    image: &image::DynamicImage,
    format: &Format,
    settings: &SessionSettings,
    output: &Path,
) -> Result<()> {
    if format.json {
        let contents = serde_json::to_string(mesh).context("Could not serialize JSON mesh")?;
        write(output, contents).context("Could not save mesh file")?;
    } else if format.json_pretty {
        let contents =
            serde_json::to_string_pretty(mesh).context("Could not serialize pretty JSON mesh")?;
        write(output, contents).context("Could not save mesh file")?;
    } else if format.yaml {
        let contents = serde_yaml::to_string(mesh).context("Could not serialize YAML mesh")?;
        write(output, contents).context("Could not save mesh file")?;
    } else if format.obj {
        let width = image.width().max(1) as f64;
        let height = image.height().max(1) as f64;
        let object = Object {
            name: "mesh".to_owned(),
            vertices: mesh
                .vertices
                .iter()
                .map(|v| Vertex {
                    x: v.point.x as _,
                    y: v.point.y as _,
                    z: 0.0,
                })
                .collect::<Vec<_>>(),
            tex_vertices: mesh
                .vertices
                .iter()
                .map(|v| TVertex {
                    u: v.point.x as f64 / width,
                    v: v.point.y as f64 / height,
                    w: 0.0,
                })
                .collect::<Vec<_>>(),
            normals: vec![Vertex {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            }],
            geometry: vec![Geometry {
                material_name: None,
                shapes: mesh
                    .triangles
                    .iter()
                    .map(|t| Shape {
                        primitive: Primitive::Triangle(
                            (t.a, Some(t.a), Some(0)),
                            (t.b, Some(t.b), Some(0)),
                            (t.c, Some(t.c), Some(0)),
                        ),
                        groups: vec![],
                        smoothing_groups: vec![],
                    })
                    .collect::<Vec<_>>(),
            }],
        };
        let objects = ObjSet {
            material_library: None,
            objects: vec![object],
        };
        obj_exporter::export_to_file(&objects, output).context("Cannot save mesh file")?;
    } else if format.png {
        let base = color_buffer_from_image(image)?;
        let rendered = render(
            &base,
            mesh,
            &PaintState::new(settings.controller.paint.centroid_bucket),
            &settings.controller.render,
        );
        image_from_color_buffer(&rendered)?
            .save(output)
            .with_context(|| format!("Cannot save output image {}", output.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn disc_image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("disc.png");
        DynamicImage::ImageRgba8(RgbaImage::from_fn(60, 60, |x, y| {
            let dx = x as i32 - 30;
            let dy = y as i32 - 30;
            if dx * dx + dy * dy <= 22 * 22 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }))
        .save(&path)
        .unwrap();
        path
    }

    fn run(args: &[&str]) -> Result<()> {
        let mut argv = vec!["coloring-mesh"];
        argv.extend_from_slice(args);
        run_app(CliArgs::try_parse_from(argv).unwrap())
    }

    fn text(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_mask() {
        let dir = tempfile::tempdir().unwrap();
        let input = disc_image(&dir);
        let output = dir.path().join("mask.png");
        run(&["mask", "-i", text(&input), "-o", text(&output)]).unwrap();
        let mask = image::open(&output).unwrap().to_luma8();
        assert_eq!(mask.get_pixel(30, 30).0, [255]);
        assert_eq!(mask.get_pixel(0, 0).0, [0]);

        run(&[
            "mask",
            "-i",
            text(&input),
            "-o",
            text(&output),
            "--mask-source",
            "alpha",
            "--invert",
        ])
        .unwrap();
        let mask = image::open(&output).unwrap().to_luma8();
        assert_eq!(mask.get_pixel(30, 30).0, [0]);
        assert_eq!(mask.get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn test_mesh_formats() {
        let dir = tempfile::tempdir().unwrap();
        let input = disc_image(&dir);

        let output = dir.path().join("mesh.json");
        run(&["mesh", "-i", text(&input), "-o", text(&output), "--json"]).unwrap();
        let json: ColoringMesh =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert!(!json.is_empty());
        assert_eq!(json.boundary_vertices_count(), 25);

        let output = dir.path().join("mesh.yaml");
        run(&["mesh", "-i", text(&input), "-o", text(&output), "--yaml"]).unwrap();
        let yaml: ColoringMesh =
            serde_yaml::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(yaml, json);

        let output = dir.path().join("mesh.obj");
        run(&["mesh", "-i", text(&input), "-o", text(&output), "--obj"]).unwrap();
        let obj = std::fs::read_to_string(&output).unwrap();
        assert!(obj.lines().any(|line| line.starts_with("f ")));

        let output = dir.path().join("mesh.png");
        run(&[
            "mesh",
            "-i",
            text(&input),
            "-o",
            text(&output),
            "--png",
            "--points",
            "12",
            "--density",
            "4",
        ])
        .unwrap();
        let rendered = image::open(&output).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (60, 60));
    }

    #[test]
    fn test_invalid_density() {
        let dir = tempfile::tempdir().unwrap();
        let input = disc_image(&dir);
        let output = dir.path().join("mesh.json");
        let result = run(&[
            "mesh",
            "-i",
            text(&input),
            "-o",
            text(&output),
            "--json",
            "--points",
            "2",
        ]);
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_paint_events() {
        let dir = tempfile::tempdir().unwrap();
        let input = disc_image(&dir);
        let settings = dir.path().join("settings.yaml");
        std::fs::write(&settings, "controller:\n  render:\n    draw_edges: false\n").unwrap();
        let events = dir.path().join("events.json");
        std::fs::write(
            &events,
            r##"[
                { "type": "key_pressed", "key": "+" },
                { "type": "color_selected", "color": "#ff0000" },
                { "type": "click", "point": { "x": 30.0, "y": 30.0 } },
                { "type": "click", "point": { "x": 1.0, "y": 1.0 } },
                { "type": "key_pressed", "key": "s" },
                { "type": "key_pressed", "key": "\u001b" },
                { "type": "color_selected", "color": "#00ff00" },
                { "type": "click", "point": { "x": 30.0, "y": 30.0 } }
            ]"##,
        )
        .unwrap();
        let output = dir.path().join("painted.png");
        run(&[
            "paint",
            "-i",
            text(&input),
            "-o",
            text(&output),
            "--settings",
            text(&settings),
            "--events",
            text(&events),
        ])
        .unwrap();
        let painted = image::open(&output).unwrap().to_rgba8();
        assert_eq!(painted.get_pixel(30, 30).0, [255, 0, 0, 255]);
        assert_eq!(painted.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }
}
