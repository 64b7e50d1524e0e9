//! Content surfaces hosted by tiles.

use std::rc::Rc;
use std::sync::Arc;

use tilework_core::geometry::Size;

/// An opaque unit of displayable content (editor, evaluator, inspector).
///
/// Tiles place surfaces but never own their internals; implementors are
/// usually cheap handles onto collaborator-owned state.
pub trait ContentSurface {
    /// Host-provided stable key, used in logs and by diagnostic hosts.
    fn surface_key(&self) -> &str;

    /// Smallest size the surface can be laid out in.
    fn min_size(&self) -> Size;

    fn preferred_size(&self) -> Size {
        self.min_size()
    }
}

impl<T: ContentSurface + ?Sized> ContentSurface for &T {
    fn surface_key(&self) -> &str {
        (**self).surface_key()
    }

    fn min_size(&self) -> Size {
        (**self).min_size()
    }

    fn preferred_size(&self) -> Size {
        (**self).preferred_size()
    }
}

impl<T: ContentSurface + ?Sized> ContentSurface for Box<T> {
    fn surface_key(&self) -> &str {
        (**self).surface_key()
    }

    fn min_size(&self) -> Size {
        (**self).min_size()
    }

    fn preferred_size(&self) -> Size {
        (**self).preferred_size()
    }
}

impl<T: ContentSurface + ?Sized> ContentSurface for Rc<T> {
    fn surface_key(&self) -> &str {
        (**self).surface_key()
    }

    fn min_size(&self) -> Size {
        (**self).min_size()
    }

    fn preferred_size(&self) -> Size {
        (**self).preferred_size()
    }
}

impl<T: ContentSurface + ?Sized> ContentSurface for Arc<T> {
    fn surface_key(&self) -> &str {
        (**self).surface_key()
    }

    fn min_size(&self) -> Size {
        (**self).min_size()
    }

    fn preferred_size(&self) -> Size {
        (**self).preferred_size()
    }
}
