use ait::api::{
    is_string_series, is_text_values, isolate_mask, read_png, save_png, Connectivity, GridRank,
    IsolateCfg, NamePattern, UniqueNamer,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ndarray::{ArrayD, Axis};
use polars::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Run the ait grid/image/label utilities from the shell")]
struct Cmd {
    /// Optional run tag; propagated to provenance sidecars and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Render |radius| of a zero grid as a grayscale PNG (3D: central z-slice)
    Radial {
        #[arg(long, value_delimiter = ',', required = true)]
        shape: Vec<usize>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },
    /// Keep components of a label image whose size lies strictly between the cuts
    Isolate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        lower: f64,
        #[arg(long, default_value_t = f64::INFINITY)]
        upper: f64,
        /// Max axes one neighbour step may change (default: all)
        #[arg(long)]
        connectivity: Option<usize>,
    },
    /// Print collision-free replacements for NAME..., one per line
    UniqueName {
        #[arg(long, value_delimiter = ',')]
        used: Vec<String>,
        #[arg(long, default_value = ait::cfg::DEFAULT_NAME_PATTERN)]
        pattern: NamePattern,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Print one JSON line per CSV column telling whether it is text
    TextColumns {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Radial { shape, out, scale } => radial_cmd(shape, out, scale, cmd.tag),
        Action::Isolate {
            input,
            out,
            lower,
            upper,
            connectivity,
        } => {
            let cfg = IsolateCfg {
                lower_cut: lower,
                larger_cut: upper,
                connectivity: connectivity.map_or(Connectivity::Full, Connectivity::Hops),
            };
            isolate_cmd(input, out, cfg, cmd.tag)
        }
        Action::UniqueName {
            used,
            pattern,
            names,
        } => {
            tracing::info!(names = ?names, used = used.len(), pattern = %pattern, "unique_name");
            for name in rename(&names, &used, pattern) {
                println!("{name}");
            }
            Ok(())
        }
        Action::TextColumns { input } => text_columns_cmd(input),
        Action::Report => report(cmd.tag),
    }
}

fn radial_cmd(shape: Vec<usize>, out: PathBuf, scale: f64, tag: Option<String>) -> Result<()> {
    tracing::info!(shape = ?shape, out = %out.display(), scale, tag = ?tag, "radial");
    let picture = radial_picture(&shape, scale)?;
    ensure_parent_dir(&out)?;
    save_png(&picture, &out).with_context(|| format!("saving {}", out.display()))?;
    write_sidecar(
        &out,
        Payload::new(
            "radial",
            json!({ "shape": shape, "scale": scale, "tag": tag }),
        ),
    )?;
    Ok(())
}

/// `|radius| * scale` as a 2D image: 1D becomes one row, 3D its central z-slice.
fn radial_picture(shape: &[usize], scale: f64) -> Result<ArrayD<f64>> {
    let rank = GridRank::from_shape(shape)?;
    if shape.contains(&0) {
        bail!("grid shape {:?} has an empty axis", shape);
    }
    let radius = rank.radial().radius;
    let plane = match rank {
        GridRank::D1(_) => radius.insert_axis(Axis(0)),
        GridRank::D2(_) => radius,
        GridRank::D3([_, _, nz]) => radius.index_axis(Axis(2), nz / 2).to_owned(),
    };
    Ok(plane.mapv(|r| r.abs() * scale))
}

fn isolate_cmd(input: PathBuf, out: PathBuf, cfg: IsolateCfg, tag: Option<String>) -> Result<()> {
    tracing::info!(
        input = %input.display(),
        out = %out.display(),
        lower = cfg.lower_cut,
        upper = cfg.larger_cut,
        connectivity = ?cfg.connectivity,
        "isolate"
    );
    let img = read_png(&input).with_context(|| format!("reading {}", input.display()))?;
    let mask = isolate_mask(&class_map(img), &cfg)?;
    let kept = mask.iter().filter(|&&m| m).count();
    tracing::info!(kept, total = mask.len(), "isolate_mask");

    ensure_parent_dir(&out)?;
    save_png(&mask.mapv(|m| if m { 255u8 } else { 0 }), &out)
        .with_context(|| format!("saving {}", out.display()))?;
    write_sidecar(
        &out,
        Payload::new(
            "isolate",
            json!({
                "input": input.to_string_lossy(),
                "lower_cut": cfg.lower_cut,
                // JSON has no infinity
                "larger_cut": cfg.larger_cut.is_finite().then_some(cfg.larger_cut),
                "connectivity": format!("{:?}", cfg.connectivity),
                "kept": kept,
                "tag": tag,
            }),
        ),
    )?;
    Ok(())
}

/// Label image of a decoded PNG: gray as-is, multi-channel via its first channel.
fn class_map(img: ArrayD<u8>) -> ArrayD<u8> {
    if img.ndim() == 3 {
        img.index_axis(Axis(2), 0).to_owned()
    } else {
        img
    }
}

/// One name goes through the scalar entry point, several through the batch one.
fn rename(names: &[String], used: &[String], pattern: NamePattern) -> Vec<String> {
    let namer = UniqueNamer::new(pattern);
    match names {
        [single] => vec![namer.name(single, used)],
        _ => namer.names(names, used),
    }
}

/// `text` follows the declared dtype, `values_text` the cells actually read.
#[derive(Debug, Serialize, PartialEq)]
struct ColumnKind {
    name: String,
    dtype: String,
    text: bool,
    values_text: bool,
}

fn text_columns(df: &DataFrame) -> Result<Vec<ColumnKind>> {
    df.iter()
        .map(|s| {
            let values = (0..s.len())
                .map(|i| s.get(i))
                .collect::<PolarsResult<Vec<_>>>()
                .with_context(|| format!("reading column {}", s.name()))?;
            Ok(ColumnKind {
                name: s.name().to_string(),
                dtype: s.dtype().to_string(),
                text: is_string_series(s),
                values_text: is_text_values(&values),
            })
        })
        .collect()
}

fn text_columns_cmd(input: PathBuf) -> Result<()> {
    tracing::info!(input = %input.display(), "text_columns");
    let df = LazyCsvReader::new(&input)
        .with_infer_schema_length(Some(100))
        .finish()
        .and_then(|lf| lf.collect())
        .with_context(|| format!("reading csv {}", input.display()))?;
    tracing::info!(rows = df.height(), cols = df.width(), "input_csv_shape");
    for kind in text_columns(&df)? {
        println!("{}", serde_json::to_string(&kind)?);
    }
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": ait::VERSION,
        "tag": tag,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, IxDyn};
    use tempfile::tempdir;

    #[test]
    fn radial_picture_is_always_two_dimensional() {
        assert_eq!(radial_picture(&[5], 1.0).unwrap().shape(), &[1, 5]);
        assert_eq!(radial_picture(&[3, 4], 1.0).unwrap().shape(), &[3, 4]);
        assert_eq!(radial_picture(&[3, 4, 6], 1.0).unwrap().shape(), &[3, 4]);
        // 1D magnitudes: |i - 2|
        let row = radial_picture(&[5], 10.0).unwrap();
        assert_eq!(row.iter().copied().collect::<Vec<_>>(), vec![20.0, 10.0, 0.0, 10.0, 20.0]);
    }

    #[test]
    fn radial_picture_rejects_bad_shapes() {
        let err = radial_picture(&[2, 2, 2, 2], 1.0).unwrap_err();
        assert!(err.to_string().contains("4 dimensions"));
        assert!(radial_picture(&[3, 0], 1.0).is_err());
    }

    #[test]
    fn class_map_takes_first_channel() {
        let rgb =
            Array3::from_shape_fn((2, 2, 3), |(y, x, c)| (y * 2 + x + c * 100) as u8).into_dyn();
        let classes = class_map(rgb);
        assert_eq!(classes.shape(), &[2, 2]);
        assert_eq!(classes[IxDyn(&[1, 1])], 3);
        let gray = ArrayD::<u8>::zeros(IxDyn(&[2, 3]));
        assert_eq!(class_map(gray.clone()), gray);
    }

    #[test]
    fn rename_uses_scalar_and_batch_paths() {
        let used = vec!["a".to_string()];
        assert_eq!(rename(&["a".into()], &used, NamePattern::default()), vec!["a_0"]);
        assert_eq!(
            rename(&["a".into(), "b".into()], &used, NamePattern::default()),
            vec!["a_0", "b_0"]
        );
    }

    #[test]
    fn text_columns_reports_each_column() {
        let df = df!(
            "label" => &[Some("x"), None],
            "count" => &[1i64, 2],
        )
        .unwrap();
        let kinds = text_columns(&df).unwrap();
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[0].name, "label");
        assert!(kinds[0].text);
        assert!(kinds[0].values_text);
        assert_eq!(kinds[1].name, "count");
        assert!(!kinds[1].text);
        assert!(!kinds[1].values_text);
    }

    #[test]
    fn text_columns_reads_csv_cells() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("cols.csv");
        std::fs::write(&csv, "name,score,note\nann,1.5,\nbob,2.0,\n").unwrap();
        let df = LazyCsvReader::new(&csv).finish().unwrap().collect().unwrap();
        let kinds = text_columns(&df).unwrap();
        let flags: Vec<_> = kinds.iter().map(|k| (k.text, k.values_text)).collect();
        // `note` holds only empty cells, so it is read as nulls
        assert_eq!(flags, vec![(true, true), (false, false), (true, true)]);
    }

    #[test]
    fn radial_cmd_writes_png_and_sidecar() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested/r.png");
        radial_cmd(vec![4, 4], out.clone(), 20.0, Some("t1".into())).unwrap();
        assert_eq!(read_png(&out).unwrap().shape(), &[4, 4]);
        let sidecar = dir.path().join("nested/r.provenance.json");
        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(doc["command"], "radial");
        assert_eq!(doc["params"]["tag"], "t1");
    }

    #[test]
    fn isolate_cmd_keeps_small_blob() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        let out = dir.path().join("out.png");
        // 2-cell blob, 4-cell blob, background 10
        let img = ndarray::array![
            [9u8, 9, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 5, 5],
            [0, 0, 5, 5]
        ];
        save_png(&img, &input).unwrap();
        let cfg = IsolateCfg {
            lower_cut: 1.0,
            larger_cut: 3.0,
            connectivity: Connectivity::Hops(1),
        };
        isolate_cmd(input, out.clone(), cfg, None).unwrap();
        let mask = read_png(&out).unwrap();
        assert_eq!(mask.iter().filter(|&&v| v == 255).count(), 2);
        assert_eq!(mask[IxDyn(&[0, 0])], 255);
        assert_eq!(mask[IxDyn(&[2, 2])], 0);
        assert!(dir.path().join("out.provenance.json").exists());
    }
}
