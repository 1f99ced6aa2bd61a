// typescan: list the reflected types found in annotated C++ headers

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::info;

use typescan::database::{Database, Method, Property, TypeId};
use typescan::{OrderStrategy, ScanOptions, Scanner, SourceList};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Order {
    /// Declaration order.
    Registration,
    /// Pairwise reachability comparator.
    Comparator,
    /// Depth leveling.
    Leveling,
    /// Number of primary bases.
    Inheritance,
}

impl From<Order> for OrderStrategy {
    fn from(order: Order) -> Self {
        match order {
            Order::Registration => OrderStrategy::Registration,
            Order::Comparator => OrderStrategy::Comparator,
            Order::Leveling => OrderStrategy::Leveling,
            Order::Inheritance => OrderStrategy::InheritanceDepth,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Header to scan. Can be provided multiple times.
    #[arg(long, value_name = "PATH")]
    file: Vec<PathBuf>,

    /// File listing headers to scan, one per line ('//' comments allowed).
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Order in which types are listed.
    #[arg(long, value_enum, default_value_t = Order::Registration)]
    order: Order,

    /// Also record private and protected members.
    #[arg(long, default_value_t = false)]
    include_private: bool,

    /// Extra export macro accepted before type and member names.
    #[arg(long, value_name = "WORD")]
    api_decl: Vec<String>,

    /// List built-in types as well.
    #[arg(long, default_value_t = false)]
    include_internal: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut units = match &args.config_file {
        Some(path) => SourceList::load(path)
            .with_context(|| format!("loading unit list {}", path.display()))?,
        None => SourceList::default(),
    };
    for file in &args.file {
        units.push(file.clone());
    }
    if units.is_empty() {
        bail!("nothing to scan: pass --file or --config-file");
    }

    let mut options = ScanOptions::default().with_private(args.include_private);
    for word in &args.api_decl {
        options = options.with_api_declaration(word.as_str());
    }

    let mut scanner = Scanner::new(options);
    let report = scanner.scan_units(&units);
    for failure in &report.failed {
        eprintln!("warning: {}", failure);
    }
    if report.scanned.is_empty() {
        bail!("none of the {} units could be read", units.len());
    }

    let (db, resolution) = scanner.finish_with_resolution();
    info!("{} types left unresolved", resolution.unresolved.len());

    let types: Vec<TypeId> = if args.include_internal {
        db.types().collect()
    } else {
        db.user_types()
    };
    let strategy = OrderStrategy::from(args.order);
    for id in strategy.apply(&db, &types) {
        print_type(&db, id);
    }

    for function in &db.free_functions {
        println!("function {}", method_line(&db, function));
    }
    for global in &db.free_properties {
        println!("global {}", property_line(&db, global));
    }
    for name in &resolution.unresolved {
        println!("external {}", name);
    }

    Ok(())
}

fn print_type(db: &Database, id: TypeId) {
    let def = db.get(id);
    let kind = if def.is_enum() {
        "enum"
    } else if def.flags.is_class {
        "class"
    } else {
        "struct"
    };

    let mut header = format!("{} {}", kind, def.name);
    if !def.bases.is_empty() {
        let bases: Vec<&str> = def.bases.iter().map(|&base| db.name(base)).collect();
        header.push_str(&format!(" : {}", bases.join(", ")));
    }
    if let Some(parent) = def.containing {
        header.push_str(&format!(" (in {})", db.name(parent)));
    }
    if !def.traits.is_empty() {
        header.push_str(&format!(" [{}]", def.traits));
    }
    println!("{}", header);

    for value in &def.enum_values {
        println!("    {} = {}", value.name, value.value);
    }
    for property in &def.properties {
        println!("    {}", property_line(db, property));
    }
    for method in &def.methods {
        println!("    {}", method_line(db, method));
    }
}

fn property_line(db: &Database, property: &Property) -> String {
    let mut line = format!("{} {}", db.full_type_name(property, true), property.name);
    if let Some(len) = property.array_len {
        line.push_str(&format!("[{}]", len));
    }
    if let Some(default) = &property.default_value {
        line.push_str(&format!(" = {}", default));
    }
    line
}

fn method_line(db: &Database, method: &Method) -> String {
    format!(
        "{} {}{}",
        db.return_text(method),
        method.name,
        db.call_signature(method)
    )
}
