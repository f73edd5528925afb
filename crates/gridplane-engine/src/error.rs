use std::fmt;
use std::path::PathBuf;

/// Shader pipeline stage, prior to linking.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub(crate) fn to_naga(self) -> wgpu::naga::ShaderStage {
        match self {
            Stage::Vertex => wgpu::naga::ShaderStage::Vertex,
            Stage::Fragment => wgpu::naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Startup failures. Every variant is fatal to initialization.
#[derive(Debug)]
pub enum GridError {
    /// A shader source file is missing or unreadable.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A single stage failed to compile; `log` is the compiler diagnostic.
    ShaderCompile { stage: Stage, log: String },

    /// Both stages compiled but do not form a valid program.
    Link { log: String },

    /// Caller passed a value outside the accepted domain.
    InvalidArgument(String),
}

impl GridError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn link(msg: impl Into<String>) -> Self {
        Self::Link { log: msg.into() }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::FileRead { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            GridError::ShaderCompile { stage, log } => {
                write!(f, "{stage} shader failed to compile:\n{log}")
            }
            GridError::Link { log } => write!(f, "shader program failed to link:\n{log}"),
            GridError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::FileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type GridResult<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_stage_and_log() {
        let e = GridError::ShaderCompile {
            stage: Stage::Fragment,
            log: "0:3: unexpected token".to_string(),
        };
        let s = e.to_string();
        assert!(s.starts_with("fragment shader failed to compile"));
        assert!(s.contains("0:3: unexpected token"));
    }

    #[test]
    fn file_read_exposes_io_source() {
        use std::error::Error;

        let e = GridError::FileRead {
            path: PathBuf::from("missing.vert"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("missing.vert"));
    }
}
