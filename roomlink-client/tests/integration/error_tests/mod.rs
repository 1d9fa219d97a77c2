mod test_backlog_dropped_on_socket_loss;
