use crate::error::PseudoError;
use crate::parser::ast::FileMode;
use indexmap::IndexMap;

/// One in-memory file: a list of logical records plus a read cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualFile {
  pub lines: Vec<String>,
  pub read_pos: usize,
  pub mode: Option<FileMode>,
  pub open: bool,
}

impl VirtualFile {
  pub fn new() -> Self {
    Self {
      lines: Vec::new(),
      read_pos: 0,
      mode: None,
      open: false,
    }
  }

  pub fn from_lines(lines: Vec<String>) -> Self {
    Self {
      lines,
      read_pos: 0,
      mode: None,
      open: false,
    }
  }
}

impl Default for VirtualFile {
  fn default() -> Self {
    Self::new()
  }
}

/// The VM-owned virtual filesystem. Opening an unknown name auto-creates
/// an empty file; nothing is ever removed, so hosts can inspect the map
/// after a run.
#[derive(Debug, Default)]
pub struct FileSystem {
  pub files: IndexMap<String, VirtualFile>,
}

impl FileSystem {
  pub fn new() -> Self {
    Self {
      files: IndexMap::new(),
    }
  }

  fn entry(&mut self, name: &str) -> &mut VirtualFile {
    self
      .files
      .entry(name.to_string())
      .or_insert_with(VirtualFile::new)
  }

  pub fn open(&mut self, name: &str, mode: FileMode) {
    let file = self.entry(name);
    file.open = true;
    file.mode = Some(mode);
    match mode {
      FileMode::Read => file.read_pos = 0,
      FileMode::Write => file.lines.clear(),
      FileMode::Append => {}
    }
  }

  pub fn read(&mut self, name: &str) -> Result<String, PseudoError> {
    let file = self.files.get_mut(name).ok_or_else(|| {
      PseudoError::runtime(format!("File '{}' is not open", name))
    })?;
    if !file.open || file.mode != Some(FileMode::Read) {
      return Err(PseudoError::runtime(format!(
        "File '{}' is not open for READ",
        name
      )));
    }
    if file.read_pos >= file.lines.len() {
      return Err(PseudoError::runtime(format!(
        "Read past end of file '{}'",
        name
      )));
    }
    let line = file.lines[file.read_pos].clone();
    file.read_pos += 1;
    Ok(line)
  }

  pub fn write(&mut self, name: &str, line: String) -> Result<(), PseudoError> {
    let file = self.files.get_mut(name).ok_or_else(|| {
      PseudoError::runtime(format!("File '{}' is not open", name))
    })?;
    if !file.open || !matches!(file.mode, Some(FileMode::Write) | Some(FileMode::Append)) {
      return Err(PseudoError::runtime(format!(
        "File '{}' is not open for WRITE",
        name
      )));
    }
    file.lines.push(line);
    Ok(())
  }

  pub fn close(&mut self, name: &str) {
    if let Some(file) = self.files.get_mut(name) {
      file.open = false;
      file.mode = None;
    }
  }

  /// 1 when the file is unknown, closed, or the cursor is at the end.
  pub fn eof(&self, name: &str) -> bool {
    match self.files.get(name) {
      Some(file) if file.open => file.read_pos >= file.lines.len(),
      _ => true,
    }
  }
}
