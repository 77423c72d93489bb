use crate::imports::*;

/// Serialization formats understood by [SerdeAPI]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerdeFormat {
    Yaml,
    Json,
    Bin,
    /// Plain text; only types that override the reader/writer accept it
    Txt,
}

impl SerdeFormat {
    /// Parses a file extension or format name, with or without leading `.`
    pub fn parse<S: AsRef<str>>(format: S) -> anyhow::Result<Self> {
        Ok(
            match format.as_ref().trim_start_matches('.').to_lowercase().as_str() {
                "yaml" | "yml" => Self::Yaml,
                "json" => Self::Json,
                "bin" => Self::Bin,
                "txt" | "csv" => Self::Txt,
                other => bail!("Unrecognized format {other:?}"),
            },
        )
    }

    fn from_path(filepath: &Path) -> anyhow::Result<Self> {
        let extension = filepath
            .extension()
            .and_then(OsStr::to_str)
            .with_context(|| format!("File extension could not be parsed: {filepath:?}"))?;
        Self::parse(extension)
    }
}

pub trait SerdeAPI: Serialize + for<'a> Deserialize<'a> {
    const ACCEPTED_BYTE_FORMATS: &'static [SerdeFormat] =
        &[SerdeFormat::Yaml, SerdeFormat::Json, SerdeFormat::Bin];
    const ACCEPTED_STR_FORMATS: &'static [SerdeFormat] = &[SerdeFormat::Yaml, SerdeFormat::Json];

    /// Runs after every deserialization; validation goes here
    fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Read (deserialize) an object from a resource file packaged with the `packcalc-core` crate
    ///
    /// # Arguments:
    ///
    /// * `filepath` - Filepath, relative to the top of the `resources` folder
    #[cfg(feature = "resources")]
    fn from_resource<P: AsRef<Path>>(filepath: P) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let format = SerdeFormat::from_path(filepath)?;
        let file = crate::resources::RESOURCES_DIR
            .get_file(filepath)
            .with_context(|| format!("File not found in resources: {filepath:?}"))?;
        Self::from_reader(file.contents(), format)
    }

    /// Write (serialize) an object to a file, creating or truncating it.
    /// The format is taken from the file extension.
    fn to_file<P: AsRef<Path>>(&self, filepath: P) -> anyhow::Result<()> {
        let filepath = filepath.as_ref();
        let format = SerdeFormat::from_path(filepath)?;
        let file = File::create(filepath)
            .with_context(|| format!("Could not create file: {filepath:?}"))?;
        self.to_writer(file, format)
    }

    /// Read (deserialize) an object from a file.
    /// The format is taken from the file extension.
    fn from_file<P: AsRef<Path>>(filepath: P) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let format = SerdeFormat::from_path(filepath)?;
        let file = File::open(filepath).with_context(|| {
            if !filepath.exists() {
                format!("File not found: {filepath:?}")
            } else {
                format!("Could not open file: {filepath:?}")
            }
        })?;
        Self::from_reader(file, format)
    }

    fn to_writer<W: std::io::Write>(&self, wtr: W, format: SerdeFormat) -> anyhow::Result<()> {
        ensure!(
            Self::ACCEPTED_BYTE_FORMATS.contains(&format),
            "Unsupported format {format:?}, must be one of {:?}",
            Self::ACCEPTED_BYTE_FORMATS
        );
        match format {
            SerdeFormat::Yaml => serde_yaml::to_writer(wtr, self)?,
            SerdeFormat::Json => serde_json::to_writer(wtr, self)?,
            SerdeFormat::Bin => bincode::serialize_into(wtr, self)?,
            SerdeFormat::Txt => bail!("No plain text writer for this type"),
        }
        Ok(())
    }

    /// Deserialize an object from anything that implements [`std::io::Read`]
    /// and run [`init`](SerdeAPI::init) on it
    fn from_reader<R: std::io::Read>(rdr: R, format: SerdeFormat) -> anyhow::Result<Self> {
        ensure!(
            Self::ACCEPTED_BYTE_FORMATS.contains(&format),
            "Unsupported format {format:?}, must be one of {:?}",
            Self::ACCEPTED_BYTE_FORMATS
        );
        let mut deserialized: Self = match format {
            SerdeFormat::Yaml => serde_yaml::from_reader(rdr)?,
            SerdeFormat::Json => serde_json::from_reader(rdr)?,
            SerdeFormat::Bin => bincode::deserialize_from(rdr)?,
            SerdeFormat::Txt => bail!("No plain text reader for this type"),
        };
        deserialized.init()?;
        Ok(deserialized)
    }

    /// Write (serialize) an object into a string
    fn to_str(&self, format: SerdeFormat) -> anyhow::Result<String> {
        ensure!(
            Self::ACCEPTED_STR_FORMATS.contains(&format),
            "Unsupported format {format:?}, must be one of {:?}",
            Self::ACCEPTED_STR_FORMATS
        );
        let mut buf = Vec::new();
        self.to_writer(&mut buf, format)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Read (deserialize) an object from a string
    fn from_str<S: AsRef<str>>(contents: S, format: SerdeFormat) -> anyhow::Result<Self> {
        ensure!(
            Self::ACCEPTED_STR_FORMATS.contains(&format),
            "Unsupported format {format:?}, must be one of {:?}",
            Self::ACCEPTED_STR_FORMATS
        );
        Self::from_reader(contents.as_ref().as_bytes(), format)
    }

    fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self)?)
    }

    fn from_json<S: AsRef<str>>(json_str: S) -> anyhow::Result<Self> {
        Self::from_str(json_str, SerdeFormat::Json)
    }

    fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(&self)?)
    }

    fn from_yaml<S: AsRef<str>>(yaml_str: S) -> anyhow::Result<Self> {
        Self::from_str(yaml_str, SerdeFormat::Yaml)
    }

    fn to_bincode(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bincode::serialize(&self)?)
    }

    fn from_bincode(encoded: &[u8]) -> anyhow::Result<Self> {
        Self::from_reader(encoded, SerdeFormat::Bin)
    }
}
