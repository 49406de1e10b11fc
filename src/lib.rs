//! # dexloader
//!
//! Reads Android DEX containers into a linked class model and resolves class names
//! that the container does not define.
//!
use crate::dex::DexError;
use std::path::Path;

#[macro_use]
pub mod dex;
pub mod loader;
pub mod model;

pub use crate::loader::{DexLoader, LoaderConfig};
pub use crate::model::{Class, ClassKind, Field, Method};

/// Reads a dex file from disk and loads it into a fresh loader with the default configuration.
///
/// # Examples
///
/// ```no_run
///  use dexloader::load_dex_file;
///  use std::path::Path;
///
///  let loader = load_dex_file(Path::new("classes.dex")).unwrap();
///  println!("{:} classes loaded.", loader.classes().len());
///  let main = loader.load("com.example.MainActivity");
///  println!("{} fake: {}", main.name, main.is_fake());
/// ```
pub fn load_dex_file(path: &Path) -> Result<DexLoader, LoadFileError>
{
    let bytes = std::fs::read(path).map_err(LoadFileError::Io)?;
    let loader = DexLoader::default();
    loader.load_classes(&bytes).map_err(LoadFileError::Dex)?;
    Ok(loader)
}

#[derive(Debug)]
pub enum LoadFileError
{
    Io(std::io::Error),
    Dex(DexError),
}

impl std::fmt::Display for LoadFileError
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            LoadFileError::Io(e) => write!(f, "cannot read dex file: {}", e),
            LoadFileError::Dex(e) => write!(f, "cannot load dex file: {}", e),
        }
    }
}

impl std::error::Error for LoadFileError
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)>
    {
        match self
        {
            LoadFileError::Io(e) => Some(e),
            LoadFileError::Dex(e) => Some(e),
        }
    }
}
