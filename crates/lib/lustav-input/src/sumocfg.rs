use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{InputError, InputResult};
use crate::xml::Attributes;

/// Input files referenced by a `.sumocfg`, resolved against the file's directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SumoInputs {
    pub net_files: Vec<PathBuf>,
    pub route_files: Vec<PathBuf>,
    pub additional_files: Vec<PathBuf>,
}

impl SumoInputs {
    pub fn read(config_file: &Path) -> InputResult<Self> {
        let file = File::open(config_file).map_err(|source| InputError::Open {
            path: config_file.display().to_string(),
            source,
        })?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text(true);
        let base = config_file.parent().unwrap_or_else(|| Path::new("."));

        let mut inputs = SumoInputs::default();
        let mut buffer = Vec::new();
        loop {
            let event = reader
                .read_event_into(&mut buffer)
                .map_err(|source| InputError::Xml {
                    position: reader.error_position(),
                    source,
                })?;
            match event {
                Event::Start(tag) | Event::Empty(tag) => {
                    let target = match tag.name().as_ref() {
                        b"net-file" => Some(&mut inputs.net_files),
                        b"route-files" => Some(&mut inputs.route_files),
                        b"additional-files" => Some(&mut inputs.additional_files),
                        _ => None,
                    };
                    if let Some(target) = target {
                        let attributes = Attributes::of(&tag)?;
                        target.extend(split_file_list(attributes.required_text("value")?, base));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buffer.clear();
        }
        debug!("Inputs of {}: {:?}", config_file.display(), inputs);
        Ok(inputs)
    }

    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.net_files
            .iter()
            .chain(self.route_files.iter())
            .chain(self.additional_files.iter())
    }

    /// Referenced files that do not exist on disk. Each is logged as a warning.
    pub fn missing(&self) -> Vec<&PathBuf> {
        let missing: Vec<&PathBuf> = self.all().filter(|path| !path.exists()).collect();
        for path in missing.iter() {
            warn!("SUMO input {} does not exist", path.display());
        }
        missing
    }
}

fn split_file_list(value: &str, base: &Path) -> Vec<PathBuf> {
    value
        .split([',', ' '])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| base.join(part))
        .collect()
}
