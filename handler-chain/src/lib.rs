//! # Handler chain
//!
//! Routes one inbound message through middleware and handlers:
//!
//! 1. middleware `before` in order; `false` stops everything and yields `Stop`
//! 2. handler `before` in order; `false` stops the chain and yields `Stop`
//! 3. handler `handle` in order until one returns `Stop` or `Reply`
//! 4. handler `after` in reverse order, then middleware `after` in reverse order, with the final response

use pathe_core::{Handler, HandlerResponse, Message, Middleware, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone, Default)]
pub struct HandlerChain {
    middleware: Vec<Arc<dyn Middleware>>,
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware (before in order, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a handler (first Stop/Reply ends the handle phase).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    #[instrument(skip(self, message), fields(message_type = %message.message_type))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_id = %message.id,
            "step: handler_chain started"
        );

        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            if !mw.before(message).await? {
                info!(
                    user_id = message.user.id,
                    middleware = %mw_name,
                    "step: middleware before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
            debug!(middleware = %mw_name, "middleware before done");
        }

        let mut final_response = HandlerResponse::Continue;
        let mut entered = 0;
        let mut blocked = false;
        for handler in &self.handlers {
            entered += 1;
            if !handler.before(message).await? {
                info!(
                    user_id = message.user.id,
                    handler = %std::any::type_name_of_val(handler.as_ref()),
                    "step: handler before returned false, chain stopped"
                );
                final_response = HandlerResponse::Stop;
                blocked = true;
                break;
            }
        }

        if !blocked {
            for handler in &self.handlers {
                let handler_name = std::any::type_name_of_val(handler.as_ref());
                let response = handler.handle(message).await?;
                let (response_type, reply_len) = match &response {
                    HandlerResponse::Continue => ("Continue", None),
                    HandlerResponse::Stop => ("Stop", None),
                    HandlerResponse::Ignore => ("Ignore", None),
                    HandlerResponse::Reply(s) => ("Reply", Some(s.len())),
                };
                debug!(
                    handler = %handler_name,
                    response_type = %response_type,
                    reply_len = ?reply_len,
                    "handler done"
                );

                if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                    info!(
                        user_id = message.user.id,
                        handler = %handler_name,
                        response_type = %response_type,
                        "step: handler chain stopped by handler"
                    );
                    final_response = response;
                    break;
                }
            }
        }

        // Only handlers whose before() ran get an after().
        for handler in self.handlers[..entered].iter().rev() {
            handler.after(message, &final_response).await?;
        }

        for mw in self.middleware.iter().rev() {
            mw.after(message, &final_response).await?;
        }

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_id = %message.id,
            "step: handler_chain finished"
        );

        Ok(final_response)
    }
}

// Tests live in tests/handler_chain_test.rs
