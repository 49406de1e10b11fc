use dexloader::load_dex_file;
use std::env;
use std::error::Error;
use std::path::Path;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("usage: dexclasses <classes.dex> [class names to resolve...]");
        return;
    }

    // Do everything else with the error trap
    match process_dex(&args[1], &args[2..]) {
        Ok(n) => {
            println!("All done: {} classes", n);
        }
        Err(e) => {
            println!("Aborted due to error: {}", e);
        }
    }
}

/* Loads the container, lists its classes, then resolves any extra names given */
fn process_dex(dex_file: &str, names: &[String]) -> Result<usize, Box<dyn Error>> {
    let loader = load_dex_file(Path::new(dex_file))?;
    let classes = loader.classes();

    for c in &classes {
        let kind = if c.is_interface { "interface" } else { "class" };
        println!(
            "{} {} extends {} ({} fields, {} methods)",
            kind,
            c.name,
            c.super_class.as_deref().unwrap_or("-"),
            c.fields().count(),
            c.methods().count()
        );
        for i in &c.interfaces {
            println!("    implements {}", i);
        }
    }

    for name in names {
        let c = loader.load(name);
        let tier = if c.is_fake() { "placeholder" } else if c.is_bridged() { "host" } else { "container" };
        println!("{} -> {} ({})", name, c.name, tier);
    }

    Ok(classes.len())
}
