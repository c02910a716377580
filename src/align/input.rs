use crate::error::{AlignError, AlignResult};

/// Borrowed reference/query/quality views with head/tail clip offsets.
///
/// Invariant (spec.md §3): `subquery` and `subquality` share the same clip
/// offsets, and all clip arithmetic is non-wrapping — `clip_head + clip_tail`
/// never exceeds the underlying length.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InputView<'a> {
    reference: &'a [u8],
    ref_clip_head: usize,
    ref_clip_tail: usize,
    query: &'a [u8],
    quality: &'a [u8],
    query_clip_head: usize,
    query_clip_tail: usize,
}

impl<'a> InputView<'a> {
    pub(crate) fn new(
        reference: &'a [u8],
        ref_clip_head: u32,
        ref_clip_tail: u32,
        query: &'a [u8],
        quality: &'a [u8],
        query_clip_head: u32,
        query_clip_tail: u32,
    ) -> AlignResult<Self> {
        if quality.len() < query.len() {
            return Err(AlignError::QualityTooShort {
                qual_len: quality.len(),
                query_len: query.len(),
            });
        }
        let (ref_clip_head, ref_clip_tail) = (ref_clip_head as usize, ref_clip_tail as usize);
        let (query_clip_head, query_clip_tail) = (query_clip_head as usize, query_clip_tail as usize);
        if ref_clip_head + ref_clip_tail > reference.len() {
            return Err(AlignError::EmptyInput);
        }
        if query_clip_head + query_clip_tail > query.len() {
            return Err(AlignError::EmptyInput);
        }
        let view = Self {
            reference,
            ref_clip_head,
            ref_clip_tail,
            query,
            quality,
            query_clip_head,
            query_clip_tail,
        };
        if view.subref().is_empty() || view.subquery().is_empty() {
            return Err(AlignError::EmptyInput);
        }
        Ok(view)
    }

    pub(crate) fn subref(&self) -> &'a [u8] {
        &self.reference[self.ref_clip_head..self.reference.len() - self.ref_clip_tail]
    }

    pub(crate) fn subquery(&self) -> &'a [u8] {
        &self.query[self.query_clip_head..self.query.len() - self.query_clip_tail]
    }

    pub(crate) fn subquality(&self) -> &'a [u8] {
        &self.quality[self.query_clip_head..self.query.len() - self.query_clip_tail]
    }

    pub(crate) fn reference(&self) -> &'a [u8] {
        self.reference
    }

    pub(crate) fn query(&self) -> &'a [u8] {
        self.query
    }

    pub(crate) fn query_clip_head(&self) -> usize {
        self.query_clip_head
    }

    pub(crate) fn query_clip_tail(&self) -> usize {
        self.query_clip_tail
    }

    pub(crate) fn ref_clip_head(&self) -> usize {
        self.ref_clip_head
    }

    pub(crate) fn subdb_len(&self) -> usize {
        self.subref().len()
    }
}
