//! 控制台会话
//!
//! 持有当前状态快照并通过 watch 通道发布，每个中间状态都可被视图观察到。
//! 自动激活在查询结果发布之后作为独立任务执行，提交本身不等待激活完成。

use std::mem;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::CardApi;
use crate::controller::{CardController, ControllerState};

/// 查询结果展示后再开始自动激活的延迟
pub const DEFAULT_ACTIVATION_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("查询或激活进行中，请稍候")]
    Busy,
}

/// 提交结果，自动激活时携带激活任务句柄
#[derive(Debug, Default)]
pub struct SubmitHandle {
    pub activation: Option<JoinHandle<()>>,
}

pub struct Session<A: CardApi + ?Sized + 'static> {
    controller: CardController<A>,
    state: Arc<watch::Sender<ControllerState>>,
    activation_delay: Duration,
}

impl<A: CardApi + ?Sized + 'static> Session<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            controller: CardController::new(api),
            state: Arc::new(state),
            activation_delay: DEFAULT_ACTIVATION_DELAY,
        }
    }

    pub fn with_activation_delay(mut self, delay: Duration) -> Self {
        self.activation_delay = delay;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// 更新输入框内容
    pub fn set_input(&self, input: impl Into<String>) {
        let input = input.into();
        self.state.send_modify(|state| state.card_id = input);
    }

    /// 提交当前输入
    ///
    /// 查询或激活进行中时拒绝提交；空输入只更新错误信息
    pub async fn submit(&self) -> Result<SubmitHandle, SessionError> {
        let mut card_id = None;
        let mut busy = false;
        self.state.send_if_modified(|state| {
            if state.is_busy() {
                busy = true;
                return false;
            }
            *state = match mem::take(state).begin_submit() {
                Ok((loading, id)) => {
                    card_id = Some(id);
                    loading
                }
                Err(rejected) => rejected,
            };
            true
        });

        if busy {
            warn!("[Console] 提交被忽略: 查询或激活进行中");
            return Err(SessionError::Busy);
        }
        let Some(card_id) = card_id else {
            return Ok(SubmitHandle::default());
        };

        let outcome = self.controller.fetch(&card_id).await;
        let mut needs_activation = false;
        self.state.send_modify(|state| {
            *state = mem::take(state).fetch_finished(outcome);
            needs_activation = state.needs_activation();
        });

        if !needs_activation {
            return Ok(SubmitHandle::default());
        }

        // 查询结果已发布，激活任务随后开始
        debug!("[Console] 已安排自动激活: card_id={}", card_id);
        let task = run_activation(
            self.controller.clone(),
            self.state.clone(),
            card_id,
            self.activation_delay,
        );
        Ok(SubmitHandle {
            activation: Some(tokio::spawn(task)),
        })
    }

    /// 单独激活指定卡片
    pub async fn activate(&self, card_id: &str) -> Result<(), SessionError> {
        let mut busy = false;
        self.state.send_if_modified(|state| {
            if state.is_busy() {
                busy = true;
                return false;
            }
            *state = mem::take(state).activation_started();
            true
        });
        if busy {
            return Err(SessionError::Busy);
        }

        let outcome = self.controller.request_activation(card_id).await;
        self.state
            .send_modify(|state| *state = mem::take(state).activation_finished(outcome));
        Ok(())
    }
}

async fn run_activation<A: CardApi + ?Sized + 'static>(
    controller: CardController<A>,
    state: Arc<watch::Sender<ControllerState>>,
    card_id: String,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    state.send_modify(|s| *s = mem::take(s).activation_started());
    let outcome = controller.request_activation(&card_id).await;
    state.send_modify(|s| *s = mem::take(s).activation_finished(outcome));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MSG_EMPTY_INPUT;
    use crate::testing::{activated_card, envelope, reply, unactivated_card, ScriptedApi};
    use tokio::sync::Notify;

    const CARD_ID: &str = "mio-bc5ae8cc-0ea7-4766-8e68-16e434bde0ef";

    #[tokio::test]
    async fn test_auto_activation_replaces_fetched_card() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(ScriptedApi::gated(gate.clone()));
        api.push_fetch(Ok(reply(200, envelope(Some(unactivated_card(CARD_ID)), None))));
        api.push_activate(Ok(reply(200, envelope(Some(activated_card(CARD_ID)), None))));

        let session = Session::new(api.clone());
        session.set_input(CARD_ID);
        let handle = session.submit().await.unwrap();

        // 激活完成前，展示的是查询结果
        let fetched = session.snapshot();
        assert!(!fetched.loading);
        assert!(fetched.needs_activation());

        gate.notify_one();
        handle.activation.expect("activation scheduled").await.unwrap();

        let done = session.snapshot();
        assert!(!done.activating);
        assert!(done.error.is_none());
        let result = done.card_data.unwrap().result.unwrap();
        assert_eq!(result.card_number, Some(4111111111111111));
        assert_eq!(result.card_cvc.as_deref(), Some("123"));
        assert_eq!(result.card_exp_date.as_deref(), Some("12/27"));
        assert_eq!(
            api.calls(),
            vec![format!("fetch:{}", CARD_ID), format!("activate:{}", CARD_ID)]
        );
    }

    #[tokio::test]
    async fn test_activated_card_schedules_nothing() {
        let api = Arc::new(ScriptedApi::default());
        api.push_fetch(Ok(reply(200, envelope(Some(activated_card(CARD_ID)), None))));

        let session = Session::new(api.clone());
        session.set_input(CARD_ID);
        let handle = session.submit().await.unwrap();

        assert!(handle.activation.is_none());
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_never_activates() {
        let api = Arc::new(ScriptedApi::default());
        api.push_fetch(Ok(reply(404, envelope(None, Some("not found")))));

        let session = Session::new(api.clone());
        session.set_input("unknown");
        let mut rx = session.subscribe();
        let handle = session.submit().await.unwrap();

        assert!(handle.activation.is_none());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.error.as_deref(), Some("not found"));
        assert!(!state.activating);
        assert_eq!(api.calls(), vec!["fetch:unknown".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let api = Arc::new(ScriptedApi::default());

        let session = Session::new(api.clone());
        session.set_input("");
        let handle = session.submit().await.unwrap();

        assert!(handle.activation.is_none());
        assert_eq!(session.snapshot().error.as_deref(), Some(MSG_EMPTY_INPUT));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejected_while_activating() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(ScriptedApi::gated(gate.clone()));
        api.push_fetch(Ok(reply(200, envelope(Some(unactivated_card(CARD_ID)), None))));
        api.push_activate(Ok(reply(200, envelope(Some(activated_card(CARD_ID)), None))));

        let session = Session::new(api.clone()).with_activation_delay(Duration::ZERO);
        session.set_input(CARD_ID);
        let mut rx = session.subscribe();
        let handle = session.submit().await.unwrap();

        rx.wait_for(|state| state.activating).await.unwrap();
        assert_eq!(session.submit().await.unwrap_err(), SessionError::Busy);
        assert_eq!(session.activate(CARD_ID).await.unwrap_err(), SessionError::Busy);

        gate.notify_one();
        handle.activation.unwrap().await.unwrap();
        assert!(!session.snapshot().is_busy());
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_standalone_activation_failure() {
        let api = Arc::new(ScriptedApi::default());
        api.push_activate(Ok(reply(500, envelope(None, Some("activation unavailable")))));

        let session = Session::new(api.clone());
        session.activate(CARD_ID).await.unwrap();

        let state = session.snapshot();
        assert_eq!(state.error.as_deref(), Some("activation unavailable"));
        assert!(!state.activating);
        assert!(state.card_data.is_none());
    }
}
