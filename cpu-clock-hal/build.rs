use std::env;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use proc_macro2::{Literal, TokenStream};
use quote::format_ident;
use quote::quote;

mod build_serde;
// Structures imported from build_serde.rs
use build_serde::ClockData;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Retrieve all enabled chip features
    let chip_name = match env::vars()
        .map(|(a, _)| a)
        .filter(|x| x.starts_with("CARGO_FEATURE_ESP32"))
        .get_one()
    {
        Ok(x) => x,
        Err(GetOneError::None) => panic!("No esp32xx Cargo feature enabled"),
        Err(GetOneError::Multiple) => panic!("Multiple esp32xx Cargo features enabled"),
    }
    .trim_start_matches("CARGO_FEATURE_")
    .to_ascii_lowercase();

    println!("cargo:rerun-if-changed=data/{}", chip_name);
    let data_dir = Path::new("data").join(&chip_name);

    // Read and parse clock.yaml
    let clock_path = data_dir.join("clock.yaml");
    let clock_content = fs::read_to_string(&clock_path)
        .map_err(|e| format!("Failed to read clock.yaml: {}", e))?;

    let data: ClockData = serde_yaml::from_str(&clock_content)
        .map_err(|e| format!("Failed to parse clock.yaml: {}", e))?;

    if data.rom_ticks_per_us.len() != data.cores {
        return Err(format!(
            "clock.yaml lists {} ticks-per-us addresses for {} cores",
            data.rom_ticks_per_us.len(),
            data.cores
        )
        .into());
    }

    // Get output path from env
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let dest_path = out_dir.join("_generated.rs");

    let mut token_stream = TokenStream::new();

    let cores = Literal::usize_unsuffixed(data.cores);
    let apb_freq_hz = Literal::u32_unsuffixed(data.apb_freq_hz);
    let ticks_addrs = data
        .rom_ticks_per_us
        .iter()
        .map(|addr| Literal::usize_unsuffixed(*addr as usize));

    token_stream.extend(quote! {
        /// Number of execution cores on this chip.
        pub const CORE_COUNT: usize = #cores;
        /// APB bus frequency the clock switch encodes into the scratch register.
        pub const APB_FREQ_HZ: u32 = #apb_freq_hz;
        /// ROM ticks-per-microsecond globals, indexed by core.
        pub const ROM_TICKS_PER_US: [usize; #cores] = [#(#ticks_addrs),*];
    });

    token_stream.extend(generate_peripherals_singleton(&data));

    // Write codegen output to file.
    let mut file = File::create(&dest_path)?;
    write!(file, "{}", token_stream)?;
    rustfmt(&dest_path);

    Ok(())
}

fn generate_peripherals_singleton(data: &ClockData) -> TokenStream {
    let peripheral_names: Vec<_> = data
        .peripherals
        .iter()
        .map(|name| format_ident!("{}", name))
        .collect();

    quote! {
        embassy_hal_internal::peripherals! {
            #(#peripheral_names,)*
        }
    }
}

enum GetOneError {
    None,
    Multiple,
}

trait IteratorExt: Iterator {
    fn get_one(self) -> Result<Self::Item, GetOneError>;
}

impl<T: Iterator> IteratorExt for T {
    fn get_one(mut self) -> Result<Self::Item, GetOneError> {
        match self.next() {
            None => Err(GetOneError::None),
            Some(res) => match self.next() {
                Some(_) => Err(GetOneError::Multiple),
                None => Ok(res),
            },
        }
    }
}

/// rustfmt a given path.
/// Failures are logged to stderr and ignored.
fn rustfmt(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match Command::new("rustfmt").args([path]).output() {
        Err(e) => {
            eprintln!("failed to exec rustfmt {:?}: {:?}", path, e);
        }
        Ok(out) => {
            if !out.status.success() {
                eprintln!("rustfmt {:?} failed:", path);
                eprintln!("=== STDOUT:");
                let _ = std::io::stderr().write_all(&out.stdout);
                eprintln!("=== STDERR:");
                let _ = std::io::stderr().write_all(&out.stderr);
            }
        }
    }
}
