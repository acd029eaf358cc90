use crate::domain::entities::common::RelativePath;

/// One file copied by the staging engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: RelativePath,
    pub size: u64,
}

/// Files a staging call placed in its destination, in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedFileSet {
    files: Vec<StagedFile>,
}

impl StagedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: RelativePath, size: u64) {
        self.files.push(StagedFile { path, size });
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagedFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.iter().map(|f| &f.path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.files.iter().any(|f| &f.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

impl<'a> IntoIterator for &'a StagedFileSet {
    type Item = &'a StagedFile;
    type IntoIter = std::slice::Iter<'a, StagedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
