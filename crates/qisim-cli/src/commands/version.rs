//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - calibrated noise simulation and readout mitigation",
        style("qisim").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qisim-ir          Circuit intermediate representation");
    println!("  qisim-noise       Calibration profiles and Kraus channels");
    println!("  qisim-compile     Validation and delay expansion passes");
    println!("  qisim-hal         Backend abstraction");
    println!("  qisim-exec        Noisy executor");
    println!("  qisim-mitigation  Readout assignment and correction");
    println!("  qisim-cli         Command-line interface");
    println!();
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
