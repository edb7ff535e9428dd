pub trait FileExtProvider {
    /// Extension this stage appends to the archive name, without the leading dot
    fn file_ext(&self) -> Option<&str>;
}
