use battery_lpp::plot::{parse_cli, run, PlotArgs};
use log::error;
use std::io::Write;

fn init_logging(args: &PlotArgs) {
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn main() {
    let args = parse_cli();
    init_logging(&args);
    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
