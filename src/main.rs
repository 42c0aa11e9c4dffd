use image::error::ImageError;

use atcq::{Atcq, Options};

use std::time::Instant;

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Parses an optional numeric argument, falling back to `default`.
fn numeric_arg<N: std::str::FromStr>(matches: &clap::ArgMatches, name: &str, default: N) -> N {
	match matches.value_of(name) {
		None => default,
		Some(v) => match v.parse() {
			Ok(n) => n,
			Err(_) => error_exit(&format!("Non-numeric value for {}", name), 2)
		}
	}
}

/// Formats the first three channels of a color as `#rrggbb`.
fn hex(color: &[f64]) -> String {
	color.iter()
		.take(3)
		.map(|c| format!("{:02x}", c.round().max(0.).min(255.) as u8))
		.fold(String::from("#"), |s, c| s + &c)
}

/// `clap`-based CLI for extracting a palette from an image.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data
///
/// 5: computation limits exceeded
///
/// 10: other, potentially unknown error
fn main() {
	let clap_matches = clap::App::new("atcq")
		.version("0.1.0")
		.about("Extracts a color palette from an image by ant-tree color quantization.")
		.arg_from_usage("-c, --colors=[N] 'Maximum number of clusters to grow; defaults to 32'")
		.arg_from_usage("-t, --target=[N] 'Reduce the palette to N disparate colors; defaults to no reduction'")
		.arg_from_usage("-i, --iterations=[N] 'Number of passes over the pixels; defaults to 5'")
		.arg_from_usage("-a, --alpha=[F] 'Error sensitivity of the similarity radius; defaults to 0.25'")
		.arg_from_usage("-d, --disconnects 'Enable eviction of unproven branches'")
		.arg_from_usage("-s, --seed=[N] 'Seed for probe selection; random if not given'")
		.arg_from_usage("-w, --window=[N] 'Pixels visited per step; defaults to all'")
		.arg_from_usage("-v... 'Verbosity; repeat for more'")
		.arg_from_usage("<INPUT> 'Path to input image'")
		.get_matches();

	env_logger::Builder::new()
		.filter_level(match clap_matches.occurrences_of("v") {
			0 => log::LevelFilter::Error,
			1 => log::LevelFilter::Info,
			_ => log::LevelFilter::Debug,
		})
		.init();

	let input_path = clap_matches.value_of("INPUT").unwrap();
	let source = match image::open(input_path) {
		Ok(i) => i,
		Err(e) => {
			let (msg, code) = match e {
				ImageError::Decoding(_) => ("Invalid image data", 4),
				ImageError::Limits(_) => ("Computation limits exceeded", 5),
				ImageError::IoError(_) => ("File not found or could not be read", 3),
				_ => ("An error occurred", 10)
			};
			error_exit(msg, code)
		}
	}.to_rgba8();

	let mut options = Options::new()
		.max_colors(numeric_arg(&clap_matches, "colors", 32))
		.max_iterations(numeric_arg(&clap_matches, "iterations", 5))
		.alpha(numeric_arg(&clap_matches, "alpha", 0.25))
		.disconnects(clap_matches.is_present("disconnects"))
		.on_progress(|t| eprintln!("Progress: {}%", (t * 100.).floor()));
	if clap_matches.is_present("seed") {
		options = options.seed(numeric_arg(&clap_matches, "seed", 0));
	}
	if clap_matches.is_present("window") {
		options = options.window_size(numeric_arg(&clap_matches, "window", 0));
	}
	let target = if clap_matches.is_present("target") {
		Some(numeric_arg(&clap_matches, "target", 0))
	} else {
		None
	};

	let mut atcq: Atcq = match Atcq::new(options) {
		Ok(a) => a,
		Err(e) => error_exit(&format!("Invalid arguments: {}", e), 2)
	};
	if let Err(e) = atcq.add_image(&source) {
		error_exit(&format!("Invalid image data: {}", e), 4)
	}
	eprintln!("Quantizing {} pixels...", atcq.samples().len());
	let started = Instant::now();
	// An error here means the tree's invariants broke, which is a bug in
	// the quantizer rather than anything wrong with the input.
	if let Err(e) = atcq.quantize_sync() {
		error_exit(&format!("Internal error: {}", e), 10)
	}
	eprintln!(
		"{} clusters in {:.2?}",
		atcq.clusters().len(),
		started.elapsed()
	);
	for entry in atcq.weighted_palette(target) {
		println!("{} {:.4}", hex(&entry.color), entry.weight);
	}
}
