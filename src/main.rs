use clap::Parser;
use lumen::camera::Camera;
use lumen::config::{self, Config, SphereKind};
use lumen::error::SetupError;
use lumen::geometry::{Shape, Sphere};
use lumen::loader;
use lumen::material::Material;
use lumen::preview::{self, PreviewMode};
use lumen::renderer::Renderer;
use lumen::scene::Scene;
use lumen::stats::RenderStats;
use lumen::texture::Texture;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// lumen — offline Monte Carlo path tracer
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    version,
    about = "Render a JSON-described scene to PNG with Monte Carlo path tracing",
    after_help = "EXAMPLES:\n  \
                  lumen scene.json render.png\n  \
                  lumen scene.json render.png 256 8\n  \
                  lumen scene.json render.png 1024 12 32 --preview"
)]
struct Cli {
    /// Scene configuration file (JSON)
    config: PathBuf,

    /// Output image path (PNG)
    output: PathBuf,

    /// Samples per pixel — 10–50 for previews, 200+ for high quality
    #[arg(default_value_t = 64)]
    samples: u32,

    /// Maximum path depth; glass and heavy interreflection want 8–16
    #[arg(default_value_t = 8)]
    bounces: u32,

    /// Samples per progressive batch; an interim latest.png is written after
    /// every batch
    #[arg(default_value_t = 8)]
    batch_size: u32,

    /// Display the finished render in the terminal
    #[arg(long)]
    preview: bool,

    /// Use the ASCII preview encoding instead of half-block true color
    #[arg(long, requires = "preview")]
    ascii: bool,
}

fn build_scene(config: &Config) -> Result<Scene, SetupError> {
    let mut scene = Scene::new();

    for model in &config.models {
        loader::load_obj_into(&mut scene, model)?;
    }

    for sphere in &config.spheres {
        let albedo = config::vec3(sphere.albedo);
        let mut material = match sphere.kind {
            SphereKind::Diffuse => Material::diffuse(albedo),
            SphereKind::Specular => Material::specular(albedo, sphere.roughness, sphere.metallic),
            SphereKind::Transmissive => Material::dielectric(sphere.ior),
        };
        material.emission = config::vec3(sphere.emissive);
        if let Some(path) = &sphere.texture {
            let texture = Texture::load(path)?;
            material.texture = Some(scene.add_texture(texture));
        }

        let slot = scene.add_material(material);
        scene.add_primitive(
            Shape::Sphere(Sphere::new(config::vec3(sphere.center), sphere.radius)),
            slot,
        );
    }

    if let Some(path) = &config.environment_texture {
        let texture = Texture::load(path)?;
        let slot = scene.add_texture(texture);
        scene.set_environment(slot);
    }
    if let Some(color) = config.background {
        scene.set_background(config::vec3(color));
    }

    if scene.is_empty() {
        return Err(SetupError::EmptyScene);
    }
    scene.compute_bvh();
    Ok(scene)
}

fn print_header(config: &Config, cli: &Cli) {
    eprintln!();
    eprintln!("  ╔═══════════════════════════════════════════════╗");
    eprintln!("  ║  lumen  ✦  Monte Carlo Path Tracer            ║");
    eprintln!("  ╚═══════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("  Scene:      {}", cli.config.display());
    eprintln!(
        "  Resolution: {}×{}",
        config.image_width, config.image_height
    );
    eprintln!(
        "  Samples:    {} spp ({} per batch)",
        cli.samples, cli.batch_size
    );
    eprintln!("  Bounces:    {}", cli.bounces);
    eprintln!();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)?;
    print_header(&config, cli);

    let mut camera = Camera::new(config.image_width, config.image_height, config.camera_fov);
    camera.look_at(
        config::vec3(config.camera_position),
        config::vec3(config.camera_target),
    );
    camera.set_aperture(config.camera_aperture);
    camera.set_focus_distance(config.camera_focus_distance);

    let scene = build_scene(&config)?;
    log::info!(
        "scene ready: {} primitives, {} lights",
        scene.primitives().len(),
        scene.light_count()
    );

    let interim = cli.output.parent().map(|dir| dir.join("latest.png"));
    let mut renderer = Renderer::new(&camera, &scene, cli.bounces);

    let start = Instant::now();
    renderer.render(
        cli.samples,
        cli.batch_size,
        config.print_progress,
        interim.as_deref(),
    );
    let elapsed = start.elapsed();

    renderer.framebuffer().save_png(&cli.output)?;
    println!("Image '{}' saved successfully!", cli.output.display());

    let stats = RenderStats::capture(
        elapsed.as_secs_f64(),
        config.image_width,
        config.image_height,
        cli.samples,
    );
    stats.print_summary();

    if cli.preview {
        let mode = if cli.ascii {
            PreviewMode::Ascii
        } else {
            PreviewMode::HalfBlock
        };
        preview::display(renderer.framebuffer(), mode);
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
