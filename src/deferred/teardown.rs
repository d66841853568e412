//! Dropping chains of deferred values.
//!
//! A value owns the value it adopted and, through its waiters, the
//! downstream values of its continuations. Left to the default drop glue, the
//! last handle of a long chain would drop each node from inside the previous
//! one. Instead a dropping node moves its links into a worklist and empties
//! every node it is the last owner of, so each node drops with nothing left
//! to recurse into.

use std::mem;
use std::rc::Rc;

use super::{Core, Deferred, Node, State};

/// A deferred value of any type, queued for teardown.
pub(crate) trait Link {
    /// Moves the links of this value into `links` when no other handle to it
    /// exists.
    fn unlink(self: Box<Self>, links: &mut Vec<Box<dyn Link>>);
}

impl<T: 'static, E: 'static> Link for Deferred<T, E> {
    fn unlink(self: Box<Self>, links: &mut Vec<Box<dyn Link>>) {
        let mut deferred = *self;
        if let Some(adopted) = deferred.take_links(links) {
            links.push(Box::new(adopted));
        }
    }
}

impl<T, E> Deferred<T, E> {
    /// Empties this value if this is its only handle, returning the value it
    /// adopted.
    fn take_links(&mut self, links: &mut Vec<Box<dyn Link>>) -> Option<Self> {
        Rc::get_mut(&mut self.node).and_then(|node| node.core.get_mut().take_links(links))
    }
}

impl<T, E> Core<T, E> {
    fn take_links(&mut self, links: &mut Vec<Box<dyn Link>>) -> Option<Deferred<T, E>> {
        for waiter in self.waiters.drain(..) {
            links.extend(waiter.into_downstream());
        }
        match mem::replace(&mut self.state, State::Pending) {
            State::Adopted(adopted) => Some(adopted),
            State::Pending | State::Fulfilled(_) | State::Rejected(_) => None,
        }
    }
}

impl<T, E> Drop for Node<T, E> {
    fn drop(&mut self) {
        let mut links = Vec::new();
        let mut adopted = self.core.get_mut().take_links(&mut links);
        while let Some(mut next) = adopted {
            adopted = next.take_links(&mut links);
        }
        while let Some(link) = links.pop() {
            link.unlink(&mut links);
        }
    }
}
