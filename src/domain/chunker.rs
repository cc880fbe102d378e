//! Chunk splitter. Bounds each chat message to a maximum size.
//!
//! Splits on line boundaries; a single line longer than the bound is
//! hard-sliced. Sizes are counted in chars, each line paying one extra unit
//! for its separator.

/// Default maximum chunk size in chars.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Split `message` into ordered chunks of at most `max_chunk_size` chars.
pub fn split_into_chunks(message: &str, max_chunk_size: usize) -> Vec<String> {
    let max = max_chunk_size.max(1);
    let mut chunks = Vec::new();
    if message.is_empty() {
        return chunks;
    }

    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in message.split('\n') {
        let line_len = line.chars().count() + 1;

        if current_len + line_len > max && !current.is_empty() {
            chunks.push(current.join("\n"));
            current.clear();
            current_len = 0;
        }

        if line_len > max {
            let chars: Vec<char> = line.chars().collect();
            chunks.extend(chars.chunks(max).map(|c| c.iter().collect::<String>()));
        } else {
            current.push(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }
    chunks
}
