//! Myers LCS over identifier sequences
//!
//! Finds the longest common subsequence of two key sequences. Matched items
//! on the LCS keep their relative order between the snapshots; every other
//! item present on both sides has to move.
//!
//! # Algorithm Choice: Why Myers?
//!
//! | Algorithm | Time | Space | Best for |
//! |-----------|------|-------|----------|
//! | DP | O(n*m) | O(n*m) | Tiny inputs |
//! | **Myers** | O((n+m)*d) | O(d²) | **Small diffs with duplicate keys** |
//! | LIS | O(n log n) | O(n) | Unique keys (see `lis.rs`) |
//!
//! With unique identifiers the diff engine skips this module and takes the
//! LIS path. Myers only runs when duplicates make the LCS ambiguous; those
//! updates are usually a handful of edits, so `d` stays small.
//!
//! # Space Complexity Note
//!
//! Backtracking needs the `V` array as it stood before every edit step, but
//! step `d` only reads diagonals `-(d-1)..=d-1`. The trace keeps just that
//! window, so memory is O(d²) rather than O(d*(n+m)). Past
//! [`MAX_EDIT_DISTANCE`] the search gives up and returns `None`; callers pick
//! a cheaper pairing instead of treating the input as having nothing in
//! common.
//!
//! # References
//!
//! - Myers, E.W. "An O(ND) Difference Algorithm and Its Variations" (1986)

/// Edit distance above which the search stops.
pub(crate) const MAX_EDIT_DISTANCE: usize = 512;

/// Inputs up to this size on both sides use the DP table.
const SMALL_INPUT: usize = 8;

/// Longest common subsequence of `old` and `new`.
///
/// Returns `(old_idx, new_idx)` pairs, strictly increasing in both
/// coordinates, or `None` when the trimmed middle needs more than
/// [`MAX_EDIT_DISTANCE`] edits.
pub(crate) fn lcs<K: Eq>(old: &[K], new: &[K]) -> Option<Vec<(usize, usize)>> {
    let n = old.len();
    let m = new.len();

    // Strip common prefix
    let mut prefix_len = 0;
    while prefix_len < n && prefix_len < m && old[prefix_len] == new[prefix_len] {
        prefix_len += 1;
    }

    // Strip common suffix
    let mut suffix_len = 0;
    while suffix_len < (n - prefix_len)
        && suffix_len < (m - prefix_len)
        && old[n - 1 - suffix_len] == new[m - 1 - suffix_len]
    {
        suffix_len += 1;
    }

    let mut pairs: Vec<(usize, usize)> = (0..prefix_len).map(|i| (i, i)).collect();

    let old_mid = &old[prefix_len..n - suffix_len];
    let new_mid = &new[prefix_len..m - suffix_len];

    if !old_mid.is_empty() && !new_mid.is_empty() {
        let mid = if old_mid.len() <= SMALL_INPUT && new_mid.len() <= SMALL_INPUT {
            small_lcs_dp(old_mid, new_mid)
        } else {
            myers_core(old_mid, new_mid)?
        };
        pairs.extend(mid.into_iter().map(|(oi, ni)| (oi + prefix_len, ni + prefix_len)));
    }

    pairs.extend((0..suffix_len).map(|i| (n - suffix_len + i, m - suffix_len + i)));
    Some(pairs)
}

/// Forward pass over diagonals `k = x - y`, then backtrack.
fn myers_core<K: Eq>(old: &[K], new: &[K]) -> Option<Vec<(usize, usize)>> {
    let n = old.len();
    let m = new.len();

    let max_d = n + m;
    let limit = max_d.min(MAX_EDIT_DISTANCE);
    let offset = limit + 1;

    // v[k + offset] = furthest x on diagonal k, for |k| <= limit + 1
    let mut v = vec![0usize; 2 * limit + 3];
    let mut trace: Vec<Vec<usize>> = Vec::with_capacity(limit + 1);

    'outer: for d in 0..=max_d {
        if d > MAX_EDIT_DISTANCE {
            tracing::debug!(n, m, "edit distance above {MAX_EDIT_DISTANCE}, giving up on Myers");
            return None;
        }

        trace.push(window(&v, offset, d));

        let d = d as isize;
        for k in (-d..=d).step_by(2) {
            let kk = (k + offset as isize) as usize;

            // At k = -d we can only come from k + 1 (insert), at k = d only
            // from k - 1 (delete); otherwise take whichever got further.
            let mut x = if k == -d || (k != d && v[kk - 1] < v[kk + 1]) {
                v[kk + 1]
            } else {
                v[kk - 1] + 1
            };
            let mut y = (x as isize - k) as usize;

            // Follow the snake
            while x < n && y < m && old[x] == new[y] {
                x += 1;
                y += 1;
            }

            v[kk] = x;

            if x >= n && y >= m {
                break 'outer;
            }
        }
    }

    Some(backtrack(&trace, old, new))
}

/// Diagonals `-(d-1)..=d-1` of `v`, the only ones step `d` reads.
fn window(v: &[usize], offset: usize, d: usize) -> Vec<usize> {
    if d == 0 {
        return Vec::new();
    }
    v[offset + 1 - d..offset + d].to_vec()
}

/// Furthest x on diagonal `k` in the window saved before step `d`.
#[inline]
fn at(snapshot: &[usize], d: isize, k: isize) -> usize {
    snapshot[(k + d - 1) as usize]
}

/// Walk the trace from `(n, m)` back to the origin collecting snake matches.
fn backtrack<K: Eq>(trace: &[Vec<usize>], old: &[K], new: &[K]) -> Vec<(usize, usize)> {
    let mut x = old.len();
    let mut y = new.len();
    let mut pairs = Vec::new();

    for (d, snapshot) in trace.iter().enumerate().rev() {
        let k = x as isize - y as isize;
        let di = d as isize;

        let prev_k = if d == 0 {
            0
        } else if k == -di || (k != di && at(snapshot, di, k - 1) < at(snapshot, di, k + 1)) {
            k + 1
        } else {
            k - 1
        };

        let prev_x = if d == 0 { 0 } else { at(snapshot, di, prev_k) };
        let prev_y = (prev_x as isize - prev_k) as usize;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            if old[x] == new[y] {
                pairs.push((x, y));
            }
        }

        if d > 0 {
            if prev_k < k {
                x = prev_x;
            } else {
                y = prev_y;
            }
        }

        if x == 0 && y == 0 {
            break;
        }
    }

    pairs.reverse();
    pairs
}

/// Plain O(n*m) DP for inputs of at most [`SMALL_INPUT`] items per side.
///
/// Uses a stack table, no trace allocation.
fn small_lcs_dp<K: Eq>(old: &[K], new: &[K]) -> Vec<(usize, usize)> {
    let n = old.len();
    let m = new.len();
    debug_assert!(n <= SMALL_INPUT && m <= SMALL_INPUT);

    // dp[i][j] = LCS length of old[..i] and new[..j]
    let mut dp = [[0u8; SMALL_INPUT + 1]; SMALL_INPUT + 1];

    for i in 1..=n {
        for j in 1..=m {
            dp[i][j] = if old[i - 1] == new[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(dp[n][m] as usize);
    let (mut i, mut j) = (n, m);

    while i > 0 && j > 0 {
        if old[i - 1] == new[j - 1] {
            pairs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    pairs.reverse();
    pairs
}

// =============================================================================
// Tests
// =============================================================================
