use tvl_core::event::Event;
use tvl_render::frame::Frame;
use tvl_runtime::program::{Cmd, Model};
use tvl_runtime::simulator::{CmdRecord, ProgramSimulator};

struct TestModel {
    executed_after_quit: bool,
    task_ran: bool,
}

#[derive(Debug)]
enum TestMsg {
    QuitInBatch,
    QuitInSequenceAfterTask,
    TaskDone,
    SetExecuted,
}

impl From<Event> for TestMsg {
    fn from(_: Event) -> Self {
        TestMsg::QuitInBatch
    }
}

impl Model for TestModel {
    type Message = TestMsg;

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
        match msg {
            TestMsg::QuitInBatch => Cmd::Batch(vec![
                Cmd::Quit,
                Cmd::Msg(TestMsg::SetExecuted), // Should NOT be executed
            ]),
            TestMsg::QuitInSequenceAfterTask => Cmd::Sequence(vec![
                Cmd::task(|| TestMsg::TaskDone),
                Cmd::Quit,
                Cmd::Msg(TestMsg::SetExecuted),
            ]),
            TestMsg::TaskDone => {
                self.task_ran = true;
                Cmd::None
            }
            TestMsg::SetExecuted => {
                self.executed_after_quit = true;
                Cmd::None
            }
        }
    }

    fn view(&self, _frame: &mut Frame) {}
}

fn model() -> TestModel {
    TestModel {
        executed_after_quit: false,
        task_ran: false,
    }
}

#[test]
fn batch_stops_after_quit() {
    let mut sim = ProgramSimulator::new(model());
    sim.init();

    sim.send(TestMsg::QuitInBatch);

    assert!(
        !sim.model().executed_after_quit,
        "Commands after Quit in Batch should not be executed"
    );
    assert!(!sim.is_running(), "Simulator should have stopped");
}

#[test]
fn sequence_runs_task_before_quit() {
    let mut sim = ProgramSimulator::new(model());

    sim.send(TestMsg::QuitInSequenceAfterTask);

    assert!(sim.model().task_ran);
    assert!(!sim.model().executed_after_quit);
    assert_eq!(
        sim.command_log(),
        &[
            CmdRecord::Sequence(3),
            CmdRecord::Task(None),
            CmdRecord::None,
            CmdRecord::Quit,
        ]
    );
}
