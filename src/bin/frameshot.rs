use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use frameshot::{
    Catalog, DeviceKind, DirSink, Editor, EditorEvent, FetchedResource, FrameshotResult,
    FsResolver, RasterOpts, ResourceResolver, resolve,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "frameshot", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a scene as `screenshot.png`.
    Export(ExportArgs),
    /// Print the catalog as JSON.
    Catalog(CatalogArgs),
    /// List device frames.
    Frames,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input scene JSON. Relative paths inside it resolve against its directory.
    #[arg(long)]
    scene: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Catalog JSON to load instead of the builtin one.
    #[arg(long)]
    path: Option<PathBuf>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    screenshot: PathBuf,
    #[serde(default)]
    frame: DeviceKind,
    #[serde(default)]
    zoom: Option<f64>,
    #[serde(default)]
    background: Option<u32>,
    #[serde(default)]
    effect: Option<u32>,
    #[serde(default)]
    catalog: Option<PathBuf>,
    #[serde(default)]
    opts: Option<RasterOpts>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Catalog(args) => cmd_catalog(args),
        Command::Frames => cmd_frames(),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<SceneFile> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: SceneFile = serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(p) => Ok(Catalog::from_path(p)?),
        None => Ok(Catalog::builtin().clone()),
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.scene)?;
    let scene_root = args.scene.parent().unwrap_or_else(|| Path::new("."));

    let catalog = load_catalog(scene.catalog.map(|p| scene_root.join(p)).as_deref())?;
    let mut editor = Editor::new(Arc::new(catalog));

    let shot_path = scene_root.join(&scene.screenshot);
    let shot = std::fs::read(&shot_path)
        .with_context(|| format!("read screenshot '{}'", shot_path.display()))?;
    editor.dispatch(EditorEvent::Upload(shot))?;
    editor.dispatch(EditorEvent::SetFrame(scene.frame))?;
    editor.dispatch(EditorEvent::SelectBackground(scene.background))?;
    editor.dispatch(EditorEvent::SelectEffect(scene.effect))?;
    if let Some(zoom) = scene.zoom {
        editor.dispatch(EditorEvent::SetZoom(zoom))?;
    }

    let opts = scene
        .opts
        .unwrap_or_default()
        .overlay(|key| std::env::var(key).ok())?;
    let resolver = SceneResolver::new(scene_root)?;
    let mut sink = DirSink::new(args.out.clone());

    let blob = editor.export_to(&resolver, &opts, &mut sink)?;
    eprintln!(
        "wrote {} ({} bytes)",
        args.out.join(&blob.name).display(),
        blob.bytes.len()
    );
    Ok(())
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.path.as_deref())?;
    let json = serde_json::to_string_pretty(&catalog).with_context(|| "serialize catalog")?;
    println!("{json}");
    Ok(())
}

fn cmd_frames() -> anyhow::Result<()> {
    for kind in DeviceKind::ALL {
        let f = resolve(kind);
        println!(
            "{:<8} {}x{} border={}",
            kind.as_str(),
            f.width(),
            f.height(),
            f.border_width()
        );
    }
    Ok(())
}

/// Local files from the scene directory; remote URLs over HTTP when built with `http`.
struct SceneResolver {
    fs: FsResolver,
    #[cfg(feature = "http")]
    http: frameshot::HttpResolver,
}

impl SceneResolver {
    fn new(root: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            fs: FsResolver::new(root),
            #[cfg(feature = "http")]
            http: frameshot::HttpResolver::new()?,
        })
    }
}

impl ResourceResolver for SceneResolver {
    fn fetch(&self, url: &str, origin: &str) -> FrameshotResult<FetchedResource> {
        #[cfg(feature = "http")]
        {
            if frameshot::is_remote_url(url) {
                return self.http.fetch(url, origin);
            }
        }
        self.fs.fetch(url, origin)
    }
}
