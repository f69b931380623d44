//! Partitioning of a call list into bounded batches.

/// Split `inputs` into consecutive slices of at most `chunk_size` items.
///
/// - empty input yields no chunks
/// - `chunk_size == 0`, fewer than two inputs, or `chunk_size > inputs.len()`
///   yields a single chunk holding everything
/// - otherwise `len / chunk_size` full chunks, then one remainder chunk if
///   the length is not a multiple of `chunk_size`
///
/// Concatenating the chunks gives back `inputs` exactly.
pub fn chunk_inputs<T>(chunk_size: usize, inputs: &[T]) -> Vec<&[T]> {
    if inputs.is_empty() {
        return Vec::new();
    }
    if chunk_size == 0 || inputs.len() < 2 || chunk_size > inputs.len() {
        return vec![inputs];
    }
    inputs.chunks(chunk_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(chunks: &[&[u32]]) -> Vec<usize> {
        chunks.iter().map(|c| c.len()).collect()
    }

    #[test]
    fn empty_input_has_no_chunks() {
        let empty: [u32; 0] = [];
        assert!(chunk_inputs(3, &empty).is_empty());
        assert!(chunk_inputs(0, &empty).is_empty());
    }

    #[test]
    fn degenerate_sizes_give_one_chunk() {
        let v = [1, 2, 3, 4, 5];
        assert_eq!(sizes(&chunk_inputs(0, &v)), vec![5]);
        assert_eq!(sizes(&chunk_inputs(6, &v)), vec![5]);
        assert_eq!(sizes(&chunk_inputs(1, &[7])), vec![1]);
    }

    #[test]
    fn full_chunks_then_remainder() {
        let v: Vec<u32> = (0..7).collect();
        assert_eq!(sizes(&chunk_inputs(3, &v)), vec![3, 3, 1]);
        assert_eq!(sizes(&chunk_inputs(7, &v)), vec![7]);
        assert_eq!(sizes(&chunk_inputs(1, &v)), vec![1; 7]);
        let even: Vec<u32> = (0..6).collect();
        assert_eq!(sizes(&chunk_inputs(2, &even)), vec![2, 2, 2]);
    }

    #[test]
    fn concatenation_preserves_order() {
        let v: Vec<u32> = (0..23).collect();
        for size in 0..30 {
            let chunks = chunk_inputs(size, &v);
            assert!(chunks.iter().all(|c| !c.is_empty()));
            let joined: Vec<u32> = chunks.concat();
            assert_eq!(joined, v, "chunk size {size}");
        }
    }
}
