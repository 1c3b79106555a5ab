/*!
 * RAII Resource Guards
 *
 * Scoped ownership of the two resources a resolution touches.
 *
 * ## Guard Types
 *
 * - **RootRef**: one counted reference on a root's directory; keeps the
 *   root fd alive for as long as the guard lives
 * - **DirGuard**: the directory a resolution currently stands in; either
 *   the borrowed root fd or an intermediate fd it owns and closes
 *
 * ## Example
 *
 * ```rust,ignore
 * let root_ref = RootRef::acquire(&handle)?;
 * let mut dir = DirGuard::root(root_ref.fd());
 * dir.replace(opened_child);   // previous intermediate fd is closed
 * dir.reset(root_ref.fd());    // back to the root, child fd closed
 * // root reference released on drop
 * ```
 */

mod fd;
mod refs;

pub use fd::DirGuard;
pub use refs::RootRef;
