use clap::{Parser, Subcommand};
use log::{info, warn};
use ndarray::{Array, ArrayD, IxDyn};
use rust_vizutils::fingerprint::{fingerprint, matches};
use rust_vizutils::model::neural_net::{ActivationFunction, NeuralNet};
use rust_vizutils::parsing::{points, synthetic, weights, Dataset};
use rust_vizutils::plotting::{
    show, BoundaryOptions, Color, DecisionBoundaryRenderer, Palette, SvgSurface,
};
use rust_vizutils::{Result, VizError};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plot the decision boundary of an exported network over labeled points
    Boundary(BoundaryArgs),

    /// Display an image with its intensities rescaled to [0, 1]
    Show {
        /// The path of a PNG image
        #[arg(short, long)]
        image_path: String,

        /// Where to write the SVG
        #[arg(short, long, default_value = "image.svg")]
        output: String,

        #[arg(long, default_value_t = 480)]
        width: u32,

        #[arg(long, default_value_t = 480)]
        height: u32,
    },

    /// Print the fingerprint of an answer
    Hash {
        answer: String,

        /// Known fingerprint to compare against
        #[arg(short, long)]
        expected: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct BoundaryArgs {
    /// The path of the labeled points, a CSV file with label,x0,x1 columns
    #[arg(short, long, required_unless_present = "synthetic")]
    data_path: Option<String>,

    /// Generate this many points in blobs instead of reading a file
    #[arg(short, long, conflicts_with = "data_path")]
    synthetic: Option<usize>,

    /// Number of blobs in the synthetic dataset
    #[arg(long, default_value_t = 2)]
    classes: usize,

    /// Seed of the synthetic dataset
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// The path of the network weights, exported in JSON format (W0, b0, W1, b1, ...)
    #[arg(short, long)]
    weight_path: String,

    /// Activation function used by the hidden layers
    #[arg(short, long, value_enum, default_value_t = ActivationFunction::ReLU)]
    activation_function: ActivationFunction,

    /// Target number of grid samples
    #[arg(short, long, default_value_t = 1000)]
    points: usize,

    /// Transparency of the data points
    #[arg(long, default_value_t = 0.1)]
    alpha: f64,

    /// Class colors, e.g. "0=#ff0000 1=#0000ff"
    #[arg(long, value_parser = parse_palette_entry, num_args = 1.., value_delimiter = ' ')]
    palette: Vec<(usize, Color)>,

    /// Outline the margin of a two-class network
    #[arg(short, long)]
    margin: bool,

    /// Where to write the SVG
    #[arg(short, long, default_value = "boundary.svg")]
    output: String,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,
}

/// Parse a `label=#rrggbb` palette entry
fn parse_palette_entry(s: &str) -> std::result::Result<(usize, Color), String> {
    let (label, color) = s
        .split_once('=')
        .ok_or_else(|| format!("expected label=#rrggbb, got {:?}", s))?;
    let label = label.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let color = color.parse::<Color>().map_err(|e| e.to_string())?;

    Ok((label, color))
}

/// Plot the boundary of the exported network and write it as SVG
fn plot_boundary(args: BoundaryArgs) -> Result<()> {
    let dataset: Dataset = match args.data_path {
        Some(path) => points::parse_dataset(&path)?,
        None => synthetic::blobs(args.synthetic.unwrap_or(0), args.classes, 0.75, args.seed)?,
    };
    info!("loaded {} points", dataset.len());

    let network = NeuralNet::new(weights::load_weights(&args.weight_path)?, args.activation_function)?;
    if network.input_size() != 2 {
        return Err(VizError::InvalidWeights(format!(
            "network expects {} inputs, points have 2",
            network.input_size()
        )));
    }

    let palette = if args.palette.is_empty() {
        Palette::default()
    } else {
        args.palette.into_iter().collect()
    };
    let options = BoundaryOptions {
        point_count: args.points,
        palette,
        alpha: args.alpha,
    };

    let mut renderer = DecisionBoundaryRenderer::new(&network, options);
    if args.margin {
        if network.output_size() == 2 {
            renderer = renderer.with_margin(&network);
        } else {
            warn!(
                "margin needs a two-class network, this one has {} classes",
                network.output_size()
            );
        }
    }

    let mut surface = SvgSurface::new(args.width, args.height);
    let report = renderer.render(&dataset.data.view(), &dataset.target.view(), &mut surface)?;
    surface.save(&args.output)?;

    info!("wrote {}", args.output);
    println!("{}", report.annotation);

    Ok(())
}

/// Load a PNG into an `H x W` (grayscale) or `H x W x 3` array
fn load_image(path: &str) -> Result<ArrayD<f64>> {
    let image = image::open(path)?;

    if image.color().has_color() {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let data = rgb.into_raw().into_iter().map(f64::from).collect();
        Ok(Array::from_shape_vec(
            IxDyn(&[height as usize, width as usize, 3]),
            data,
        )?)
    } else {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        let data = gray.into_raw().into_iter().map(f64::from).collect();
        Ok(Array::from_shape_vec(
            IxDyn(&[height as usize, width as usize]),
            data,
        )?)
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Boundary(boundary) => plot_boundary(boundary),
        Command::Show {
            image_path,
            output,
            width,
            height,
        } => {
            let image = load_image(&image_path)?;
            let mut surface = SvgSurface::new(width, height);
            let shown = show(&image.view(), &mut surface)?;
            let (rows, cols) = shown.dims();

            surface.save(&output)?;
            info!("wrote {}x{} image to {}", cols, rows, output);
            Ok(())
        }
        Command::Hash { answer, expected } => {
            let digest = fingerprint(answer.as_str())?;
            println!("{}", digest);

            if let Some(expected) = expected {
                let ok = matches(answer.as_str(), &expected)?;
                println!("{}", if ok { "correct" } else { "incorrect" });
            }
            Ok(())
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
