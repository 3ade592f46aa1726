use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Tail a sheet and print every new row as a JSON line
    Read {
        #[arg(long, help = "Connector config file (KEY=VALUE lines)")]
        config: String,

        #[arg(
            long,
            help = "Position to resume from, as printed in a previous run's `position` field"
        )]
        position: Option<String>,

        #[arg(long, help = "Stop after this many records")]
        limit: Option<u64>,
    },
    /// Append JSON array rows read from stdin to a sheet
    Write {
        #[arg(long, help = "Connector config file (KEY=VALUE lines)")]
        config: String,
    },
    /// Print the plugin specification
    Spec {
        #[arg(
            long,
            help = "If specified, writes the specification to this file instead of stdout"
        )]
        output: Option<String>,
    },
}
